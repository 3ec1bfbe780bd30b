//! Pace-based currency rewards

use crate::error::SessionError;
use crate::round::RoundSummary;
use hog_shared::NOMINAL_PACE_DIVISOR;
use log::{info, warn};

/// Reward for clearing `threshold` contributions in `elapsed_seconds`.
///
/// `(threshold / 40) / elapsed_seconds * multiplier`. Fails with
/// `DegenerateTiming` when the elapsed time is zero, negative or not finite.
pub fn compute_round_reward(
    threshold: u32,
    elapsed_seconds: f64,
    multiplier: f64,
) -> Result<f64, SessionError> {
    if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
        return Err(SessionError::DegenerateTiming { elapsed_seconds });
    }
    Ok((threshold as f64 / NOMINAL_PACE_DIVISOR) / elapsed_seconds * multiplier)
}

/// Currency earned over the session
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreState {
    pub currency: f64,
    pub last_round_reward: f64,
    pub multiplier: f64,
    pub rounds_completed: u32,
    min_round_seconds: f64,
}

impl ScoreState {
    pub fn new(multiplier: f64, min_round_seconds: f64) -> Self {
        Self {
            currency: 0.0,
            last_round_reward: 0.0,
            multiplier,
            rounds_completed: 0,
            min_round_seconds,
        }
    }

    /// Scores a finished round and adds the reward to the running total.
    ///
    /// Rounds shorter than the minimum duration are scored at the minimum.
    pub fn award(&mut self, summary: &RoundSummary) -> f64 {
        let elapsed_seconds = if summary.elapsed_seconds >= self.min_round_seconds {
            summary.elapsed_seconds
        } else {
            warn!(
                "Stage {} cleared in {}s, scoring it as {}s",
                summary.stage_cleared, summary.elapsed_seconds, self.min_round_seconds
            );
            self.min_round_seconds
        };

        let reward = match compute_round_reward(summary.threshold, elapsed_seconds, self.multiplier)
        {
            Ok(reward) => reward,
            Err(e) => {
                warn!("Stage {} earned no reward: {}", summary.stage_cleared, e);
                0.0
            }
        };

        self.currency += reward;
        self.last_round_reward = reward;
        self.rounds_completed += 1;
        info!(
            "Stage {} cleared in {:.3}s, reward {:.2}, currency {:.2}",
            summary.stage_cleared, summary.elapsed_seconds, reward, self.currency
        );

        reward
    }
}
