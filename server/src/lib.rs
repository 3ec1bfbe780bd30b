//! # Cooperative Session Server Library
//!
//! This library holds the authoritative session logic for a four-player
//! cooperative party game. Participants each take one of four fixed roles
//! and jointly "boop" toward a per-round threshold. Clearing the threshold
//! ends the round, converts the time taken into a currency reward and waits
//! for every player to ready up before a harder round begins.
//!
//! ## Core Responsibilities
//!
//! ### Role Assignment
//! Binds participants to the first free role slot in a fixed order, refuses
//! joins once all four slots are taken and reclaims slots on departure.
//!
//! ### Round Lifecycle
//! Accumulates contributions, detects round completion, gates the next round
//! on readiness of every occupied slot and rescales the threshold per stage.
//!
//! ### Scoring
//! Rewards rounds cleared faster than a nominal pace, with a guard for rounds
//! that complete with no measurable elapsed time.
//!
//! ### State Exposure
//! Produces a serializable `StateView` after any event for the transport
//! layer to diff and deliver. How that happens is up to the transport.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Sessions
//! All events for one session are processed sequentially by a single task.
//! Contribution totals and the readiness check are only correct under that
//! ordering. Independent sessions share no state and can run anywhere.
//!
//! ### Narrow Components
//! The roster, the round controller and the score are separate owned values.
//! Only `GameSession` touches more than one of them, always in the same order.
//!
//! ## Module Organization
//!
//! - `roles`: participant to role slot binding
//! - `round`: round state machine and per-role counters
//! - `scoring`: reward formula and accumulated currency
//! - `session`: the facade receiving join, leave and command events
//! - `host`: tokio task wrapper that serializes events for one session
//! - `clock`: elapsed-time sources used for round timing
//! - `config`: per-session tunables
//! - `console`: line commands understood by the bundled binary
//!
//! ## Usage Example
//!
//! ```rust
//! use hog_server::clock::ManualClock;
//! use hog_server::config::SessionConfig;
//! use hog_server::session::{GameSession, JoinOutcome};
//! use hog_shared::Role;
//!
//! let clock = ManualClock::new();
//! let mut session = GameSession::new(SessionConfig::default(), Box::new(clock.clone())).unwrap();
//!
//! assert_eq!(session.on_participant_join("alice", false), Ok(JoinOutcome::Player(Role::Booster)));
//!
//! clock.advance(5_000);
//! session.on_command("alice", "boop", 10.0).unwrap();
//!
//! let view = session.snapshot();
//! assert_eq!(view.stage, 2);
//! assert!(view.between_rounds);
//! assert!((view.currency - 5.0).abs() < 1e-9);
//! ```

pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod roles;
pub mod round;
pub mod scoring;
pub mod session;

pub use error::SessionError;
