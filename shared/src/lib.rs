use serde::{Deserialize, Serialize};
use std::fmt;

pub const SESSION_NAME: &str = "feral-hog-distribution";
pub const MAX_PARTICIPANTS: usize = 4;
pub const BOOPS_REQUIRED_PER_ROUND: u32 = 10;
pub const DEFAULT_REWARD_MULTIPLIER: f64 = 100.0;
/// Contributions per second a round is expected to take at nominal pace is
/// `threshold / NOMINAL_PACE_DIVISOR`.
pub const NOMINAL_PACE_DIVISOR: f64 = 40.0;

/// One of the four fixed job slots, in declaration order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Booster,
    Navigator,
    Wrangler,
    LifeSupport,
}

impl Role {
    pub const ALL: [Role; MAX_PARTICIPANTS] = [
        Role::Booster,
        Role::Navigator,
        Role::Wrangler,
        Role::LifeSupport,
    ];

    /// Stable slot index, matching the position in `Role::ALL`.
    pub fn slot(self) -> usize {
        match self {
            Role::Booster => 0,
            Role::Navigator => 1,
            Role::Wrangler => 2,
            Role::LifeSupport => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Booster => "booster",
            Role::Navigator => "navigator",
            Role::Wrangler => "wrangler",
            Role::LifeSupport => "lifeSupport",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gameplay commands a participant can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Boop,
    Ready,
}

impl Command {
    /// Matches the command name exactly; anything else is unrecognized.
    pub fn parse(name: &str) -> Option<Command> {
        match name {
            "boop" => Some(Command::Boop),
            "ready" => Some(Command::Ready),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Boop => "boop",
            Command::Ready => "ready",
        }
    }
}

/// Message body a participant sends to its session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientMessage {
    pub command: String,
    pub value: f64,
}

impl ClientMessage {
    pub fn new(command: impl Into<String>, value: f64) -> Self {
        Self {
            command: command.into(),
            value,
        }
    }
}

/// Per-role slice of the session snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoleView {
    pub role: Role,
    pub holder: Option<String>,
    pub ready: bool,
    pub round_contribution: u32,
    pub lifetime_contribution: u64,
}

/// Read-only view of a session handed to whatever broadcasts state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StateView {
    pub stage: u32,
    pub between_rounds: bool,
    pub threshold: u32,
    pub round_contribution: u32,
    pub lifetime_contribution: u64,
    pub rounds_completed: u32,
    pub seconds_for_last_round: f64,
    pub currency: f64,
    pub last_round_reward: f64,
    pub multiplier: f64,
    pub roles: Vec<RoleView>,
    pub spectators: Vec<String>,
}

impl StateView {
    pub fn role(&self, role: Role) -> Option<&RoleView> {
        self.roles.iter().find(|view| view.role == role)
    }

    /// Participant ids currently holding a role, in slot order.
    pub fn players(&self) -> Vec<&str> {
        self.roles
            .iter()
            .filter_map(|view| view.holder.as_deref())
            .collect()
    }

    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<StateView, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
