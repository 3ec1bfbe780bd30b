use crate::error::SessionError;
use hog_shared::{BOOPS_REQUIRED_PER_ROUND, DEFAULT_REWARD_MULTIPLIER};
use std::time::Duration;

/// Tunables for a single session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Threshold for stage N is `N * boops_per_round`
    pub boops_per_round: u32,
    /// Scales the pace-based reward granted at round completion
    pub reward_multiplier: f64,
    /// Rounds measured shorter than this are scored as if they took this long
    pub min_round_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            boops_per_round: BOOPS_REQUIRED_PER_ROUND,
            reward_multiplier: DEFAULT_REWARD_MULTIPLIER,
            min_round_duration: Duration::from_millis(1),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.boops_per_round == 0 {
            return Err(SessionError::InvalidConfig(
                "boops_per_round must be at least 1".to_string(),
            ));
        }
        if !self.reward_multiplier.is_finite() || self.reward_multiplier < 0.0 {
            return Err(SessionError::InvalidConfig(format!(
                "reward_multiplier must be finite and non-negative, got {}",
                self.reward_multiplier
            )));
        }
        if self.min_round_duration.is_zero() {
            return Err(SessionError::InvalidConfig(
                "min_round_duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn min_round_seconds(&self) -> f64 {
        self.min_round_duration.as_secs_f64()
    }
}
