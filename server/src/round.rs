//! Round lifecycle: contribution accumulation, completion and readiness gating
//!
//! A session alternates between two phases. During `ActiveRound` every
//! contribution is added to the round total and the round completes as soon as
//! the total reaches the threshold. Completion advances the stage, stops the
//! clock and moves to `BetweenRounds`. The next round starts once every
//! occupied role has signalled readiness; only then is the threshold
//! recomputed for the new stage and the round counters reset.

use crate::clock::Clock;
use crate::error::SessionError;
use hog_shared::{Role, MAX_PARTICIPANTS};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    ActiveRound,
    BetweenRounds,
}

/// Mutable per-slot data, kept even while the slot is vacant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRoleState {
    pub ready: bool,
    pub round_contribution: u32,
    pub lifetime_contribution: u64,
}

/// What a completed round looked like, handed to scoring
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub stage_cleared: u32,
    pub threshold: u32,
    pub elapsed_seconds: f64,
}

pub struct RoundController {
    phase: RoundPhase,
    stage: u32,
    threshold: u32,
    round_contribution: u32,
    lifetime_contribution: u64,
    seconds_for_last_round: f64,
    boops_per_round: u32,
    role_states: [PlayerRoleState; MAX_PARTICIPANTS],
    clock: Box<dyn Clock>,
}

impl RoundController {
    /// Starts stage 1 immediately, with the clock running.
    pub fn new(boops_per_round: u32, mut clock: Box<dyn Clock>) -> Self {
        clock.clear();
        clock.start();
        Self {
            phase: RoundPhase::ActiveRound,
            stage: 1,
            threshold: boops_per_round,
            round_contribution: 0,
            lifetime_contribution: 0,
            seconds_for_last_round: 0.0,
            boops_per_round,
            role_states: Default::default(),
            clock,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_between_rounds(&self) -> bool {
        self.phase == RoundPhase::BetweenRounds
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn round_contribution(&self) -> u32 {
        self.round_contribution
    }

    pub fn lifetime_contribution(&self) -> u64 {
        self.lifetime_contribution
    }

    pub fn seconds_for_last_round(&self) -> f64 {
        self.seconds_for_last_round
    }

    pub fn role_state(&self, role: Role) -> &PlayerRoleState {
        &self.role_states[role.slot()]
    }

    pub fn threshold_for_stage(&self, stage: u32) -> u32 {
        stage.saturating_mul(self.boops_per_round)
    }

    /// Adds a contribution on behalf of a role
    ///
    /// Returns the summary of the round if this contribution completed it.
    /// Fails with `RoundNotActive` between rounds, leaving all counters as
    /// they were.
    pub fn record_contribution(
        &mut self,
        role: Role,
        amount: u32,
    ) -> Result<Option<RoundSummary>, SessionError> {
        if self.phase != RoundPhase::ActiveRound {
            return Err(SessionError::RoundNotActive);
        }

        let state = &mut self.role_states[role.slot()];
        state.round_contribution = state.round_contribution.saturating_add(amount);
        state.lifetime_contribution = state.lifetime_contribution.saturating_add(amount as u64);
        self.round_contribution = self.round_contribution.saturating_add(amount);
        self.lifetime_contribution = self.lifetime_contribution.saturating_add(amount as u64);

        debug!(
            "{} contributed {} ({}/{})",
            role, amount, self.round_contribution, self.threshold
        );

        if self.round_contribution >= self.threshold {
            Ok(Some(self.complete_round()))
        } else {
            Ok(None)
        }
    }

    fn complete_round(&mut self) -> RoundSummary {
        self.clock.stop();
        self.seconds_for_last_round = self.clock.elapsed_millis() as f64 / 1000.0;
        self.clock.clear();

        let summary = RoundSummary {
            stage_cleared: self.stage,
            threshold: self.threshold,
            elapsed_seconds: self.seconds_for_last_round,
        };

        self.stage += 1;
        self.phase = RoundPhase::BetweenRounds;
        for state in self.role_states.iter_mut() {
            state.ready = false;
        }

        info!(
            "Stage {} complete after {:.3}s, waiting for players to ready up for stage {}",
            summary.stage_cleared, summary.elapsed_seconds, self.stage
        );

        summary
    }

    /// Marks a role ready for the next round
    ///
    /// Fails with `RoundInProgress` while a round is active.
    pub fn mark_ready(&mut self, role: Role) -> Result<(), SessionError> {
        if self.phase != RoundPhase::BetweenRounds {
            return Err(SessionError::RoundInProgress);
        }
        self.role_states[role.slot()].ready = true;
        debug!("{} is ready for stage {}", role, self.stage);
        Ok(())
    }

    /// Clears the readiness of a slot whose holder changed
    pub fn reset_readiness(&mut self, role: Role) {
        self.role_states[role.slot()].ready = false;
    }

    /// Starts the next round if every occupied role is ready
    ///
    /// Vacant slots are ignored. With no occupied roles at all nothing
    /// happens. Returns true if a round was started.
    pub fn start_round_if_ready(&mut self, occupied: &[Role]) -> bool {
        if self.phase != RoundPhase::BetweenRounds || occupied.is_empty() {
            return false;
        }

        let everyone_ready = occupied
            .iter()
            .all(|role| self.role_states[role.slot()].ready);
        if !everyone_ready {
            return false;
        }

        self.start_round();
        true
    }

    fn start_round(&mut self) {
        self.threshold = self.threshold_for_stage(self.stage);
        self.round_contribution = 0;
        for state in self.role_states.iter_mut() {
            state.round_contribution = 0;
            state.ready = false;
        }
        self.phase = RoundPhase::ActiveRound;
        self.clock.start();

        info!(
            "Stage {} started, {} boops required",
            self.stage, self.threshold
        );
    }
}

impl std::fmt::Debug for RoundController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundController")
            .field("phase", &self.phase)
            .field("stage", &self.stage)
            .field("threshold", &self.threshold)
            .field("round_contribution", &self.round_contribution)
            .field("lifetime_contribution", &self.lifetime_contribution)
            .field("role_states", &self.role_states)
            .finish_non_exhaustive()
    }
}
