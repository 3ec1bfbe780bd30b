//! Error kinds surfaced by session operations
//!
//! None of these are fatal to a session. Callers either refuse the triggering
//! event (full session, duplicate join) or log and drop it.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("session is full")]
    SessionFull,

    #[error("participant {participant} already joined")]
    AlreadyAssigned { participant: String },

    #[error("participant {participant} holds no role")]
    UnknownParticipant { participant: String },

    #[error("participant {participant} cannot contribute without a role")]
    NoRoleAssigned { participant: String },

    #[error("unrecognized command {command:?}")]
    InvalidCommand { command: String },

    #[error("contribution must be a non-negative finite number, got {value}")]
    InvalidContribution { value: f64 },

    #[error("round completed after {elapsed_seconds}s, cannot compute a reward")]
    DegenerateTiming { elapsed_seconds: f64 },

    #[error("no round is active")]
    RoundNotActive,

    #[error("a round is already in progress")]
    RoundInProgress,

    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    #[error("session is no longer running")]
    SessionClosed,
}
