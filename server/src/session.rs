//! Single entry point for everything that happens to a session
//!
//! The transport layer reports joins, leaves and messages here. The session
//! applies each event to the role roster and the round controller in a fixed
//! order, so the two never disagree about who is playing, and exposes the
//! result as a `StateView`.

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::roles::RoleAssignmentManager;
use crate::round::RoundController;
use crate::scoring::ScoreState;
use hog_shared::{ClientMessage, Command, Role, RoleView, StateView};
use log::{debug, info, warn};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Player(Role),
    Spectator,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    Contributed,
    RoundCompleted { stage_cleared: u32, reward: f64 },
    Ready,
    RoundStarted { stage: u32 },
}

#[derive(Debug)]
pub struct GameSession {
    roles: RoleAssignmentManager,
    round: RoundController,
    score: ScoreState,
    spectators: BTreeSet<String>,
}

impl GameSession {
    pub fn new(config: SessionConfig, clock: Box<dyn Clock>) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            roles: RoleAssignmentManager::new(),
            round: RoundController::new(config.boops_per_round, clock),
            score: ScoreState::new(config.reward_multiplier, config.min_round_seconds()),
            spectators: BTreeSet::new(),
        })
    }

    pub fn with_system_clock(config: SessionConfig) -> Result<Self, SessionError> {
        Self::new(config, Box::new(SystemClock::new()))
    }

    /// Admits a participant, as a player unless `as_spectator` is set
    ///
    /// A refused join (`SessionFull`, `AlreadyAssigned`) leaves the session
    /// untouched; the caller decides whether to disconnect the participant or
    /// readmit them as a spectator.
    pub fn on_participant_join(
        &mut self,
        participant: &str,
        as_spectator: bool,
    ) -> Result<JoinOutcome, SessionError> {
        if self.spectators.contains(participant) || self.roles.role_of(participant).is_some() {
            return Err(SessionError::AlreadyAssigned {
                participant: participant.to_string(),
            });
        }

        if as_spectator {
            self.spectators.insert(participant.to_string());
            info!("Participant {} is spectating", participant);
            return Ok(JoinOutcome::Spectator);
        }

        let role = self.roles.assign_unfilled_role(participant)?;
        self.round.reset_readiness(role);
        if self.round.is_between_rounds() {
            self.start_round_if_ready();
        }

        Ok(JoinOutcome::Player(role))
    }

    /// Removes a participant; unknown or repeated leaves are ignored
    ///
    /// Contributions the participant already made stay counted.
    pub fn on_participant_leave(&mut self, participant: &str) -> Option<Role> {
        if self.spectators.remove(participant) {
            info!("Spectator {} left", participant);
            return None;
        }

        match self.roles.release_role(participant) {
            Ok(role) => {
                self.round.reset_readiness(role);
                if self.round.is_between_rounds() {
                    self.start_round_if_ready();
                }
                Some(role)
            }
            Err(e) => {
                debug!("Ignoring leave: {}", e);
                None
            }
        }
    }

    /// Applies a gameplay command from a participant
    ///
    /// Every error is logged here and leaves the state unchanged; callers are
    /// free to drop it without replying to the sender.
    pub fn on_command(
        &mut self,
        participant: &str,
        command: &str,
        value: f64,
    ) -> Result<CommandOutcome, SessionError> {
        let result = match Command::parse(command) {
            Some(Command::Boop) => self.record_contribution(participant, value),
            Some(Command::Ready) => self.mark_ready(participant),
            None => Err(SessionError::InvalidCommand {
                command: command.to_string(),
            }),
        };

        if let Err(e) = &result {
            warn!("Dropped {:?} from {}: {}", command, participant, e);
        }
        result
    }

    pub fn on_message(
        &mut self,
        participant: &str,
        message: &ClientMessage,
    ) -> Result<CommandOutcome, SessionError> {
        self.on_command(participant, &message.command, message.value)
    }

    fn record_contribution(
        &mut self,
        participant: &str,
        value: f64,
    ) -> Result<CommandOutcome, SessionError> {
        let role = self
            .roles
            .role_of(participant)
            .ok_or_else(|| SessionError::NoRoleAssigned {
                participant: participant.to_string(),
            })?;
        let amount = contribution_amount(value)?;

        match self.round.record_contribution(role, amount)? {
            Some(summary) => {
                let reward = self.score.award(&summary);
                Ok(CommandOutcome::RoundCompleted {
                    stage_cleared: summary.stage_cleared,
                    reward,
                })
            }
            None => Ok(CommandOutcome::Contributed),
        }
    }

    fn mark_ready(&mut self, participant: &str) -> Result<CommandOutcome, SessionError> {
        let role = self
            .roles
            .role_of(participant)
            .ok_or_else(|| SessionError::UnknownParticipant {
                participant: participant.to_string(),
            })?;
        self.round.mark_ready(role)?;

        if self.start_round_if_ready() {
            Ok(CommandOutcome::RoundStarted {
                stage: self.round.stage(),
            })
        } else {
            Ok(CommandOutcome::Ready)
        }
    }

    fn start_round_if_ready(&mut self) -> bool {
        let occupied = self.roles.occupied_roles();
        self.round.start_round_if_ready(&occupied)
    }

    pub fn role_of(&self, participant: &str) -> Option<Role> {
        self.roles.role_of(participant)
    }

    pub fn is_between_rounds(&self) -> bool {
        self.round.is_between_rounds()
    }

    pub fn snapshot(&self) -> StateView {
        let roles = Role::ALL
            .into_iter()
            .map(|role| {
                let state = self.round.role_state(role);
                RoleView {
                    role,
                    holder: self.roles.holder_of(role).map(str::to_string),
                    ready: state.ready,
                    round_contribution: state.round_contribution,
                    lifetime_contribution: state.lifetime_contribution,
                }
            })
            .collect();

        StateView {
            stage: self.round.stage(),
            between_rounds: self.round.is_between_rounds(),
            threshold: self.round.threshold(),
            round_contribution: self.round.round_contribution(),
            lifetime_contribution: self.round.lifetime_contribution(),
            rounds_completed: self.score.rounds_completed,
            seconds_for_last_round: self.round.seconds_for_last_round(),
            currency: self.score.currency,
            last_round_reward: self.score.last_round_reward,
            multiplier: self.score.multiplier,
            roles,
            spectators: self.spectators.iter().cloned().collect(),
        }
    }
}

/// Converts a raw command value into a contribution amount.
///
/// Negative and non-finite values are rejected. Fractions are truncated and
/// values beyond `u32::MAX` saturate.
fn contribution_amount(value: f64) -> Result<u32, SessionError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SessionError::InvalidContribution { value });
    }
    Ok(value as u32)
}
