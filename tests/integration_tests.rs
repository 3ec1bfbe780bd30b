//! Integration tests for the cooperative session server
//!
//! These tests drive whole sessions through the public facade and host,
//! checking the roster, round lifecycle and scoring together.

use assert_approx_eq::assert_approx_eq;
use hog_server::clock::ManualClock;
use hog_server::config::SessionConfig;
use hog_server::host::SessionHandle;
use hog_server::session::{CommandOutcome, GameSession, JoinOutcome};
use hog_server::SessionError;
use hog_shared::{ClientMessage, Role, StateView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

fn new_session() -> (GameSession, ManualClock) {
    let clock = ManualClock::new();
    let session = GameSession::new(SessionConfig::default(), Box::new(clock.clone())).unwrap();
    (session, clock)
}

/// ROSTER TESTS
mod roster_tests {
    use super::*;

    fn assert_bijection(view: &StateView, expected: &HashMap<String, Role>) {
        let mut seen = HashSet::new();
        for role_view in &view.roles {
            if let Some(holder) = &role_view.holder {
                assert!(seen.insert(holder.clone()), "{} holds two roles", holder);
                assert_eq!(expected.get(holder), Some(&role_view.role));
            }
        }
        assert_eq!(seen.len(), expected.len());
    }

    /// Random join/leave churn never breaks the participant-role bijection
    #[test]
    fn random_churn_keeps_bijection() {
        let (mut session, _) = new_session();
        let mut rng = StdRng::seed_from_u64(7);
        let mut expected: HashMap<String, Role> = HashMap::new();

        for _ in 0..2_000 {
            let participant = format!("p{}", rng.gen_range(0..8));

            if rng.gen_bool(0.5) {
                let full = expected.len() == 4;
                match session.on_participant_join(&participant, false) {
                    Ok(JoinOutcome::Player(role)) => {
                        assert!(!full);
                        assert!(!expected.contains_key(&participant));
                        expected.insert(participant, role);
                    }
                    Ok(JoinOutcome::Spectator) => panic!("player join admitted as spectator"),
                    Err(SessionError::AlreadyAssigned { .. }) => {
                        assert!(expected.contains_key(&participant));
                    }
                    Err(SessionError::SessionFull) => {
                        assert!(full);
                        assert!(!expected.contains_key(&participant));
                    }
                    Err(e) => panic!("unexpected error {}", e),
                }
            } else {
                let released = session.on_participant_leave(&participant);
                assert_eq!(released, expected.remove(&participant));
            }

            assert_bijection(&session.snapshot(), &expected);
        }
    }

    /// A fifth player cannot join a full session, and nothing changes
    #[test]
    fn fifth_join_fails_without_mutation() {
        let (mut session, _) = new_session();
        for participant in ["a", "b", "c", "d"] {
            session.on_participant_join(participant, false).unwrap();
        }
        session.on_command("a", "boop", 3.0).unwrap();
        let before = session.snapshot();

        assert_eq!(
            session.on_participant_join("e", false),
            Err(SessionError::SessionFull)
        );
        assert_eq!(session.snapshot(), before);

        // The transport may still admit them to watch
        assert_eq!(
            session.on_participant_join("e", true),
            Ok(JoinOutcome::Spectator)
        );
    }

    /// A freed first slot goes to the next joiner
    #[test]
    fn freed_slot_reassigned_in_declaration_order() {
        let (mut session, _) = new_session();

        assert_eq!(
            session.on_participant_join("A", false),
            Ok(JoinOutcome::Player(Role::Booster))
        );
        session.on_participant_leave("A");
        assert_eq!(
            session.on_participant_join("B", false),
            Ok(JoinOutcome::Player(Role::Booster))
        );
    }
}

/// ROUND LIFECYCLE TESTS
mod round_tests {
    use super::*;

    /// Stage 1, single participant, 4 + 6 boops in 5 seconds
    #[test]
    fn single_player_clears_stage_one() {
        let (mut session, clock) = new_session();
        session.on_participant_join("solo", false).unwrap();

        session.on_command("solo", "boop", 4.0).unwrap();
        assert!(!session.is_between_rounds());

        clock.advance(5_000);
        let outcome = session.on_command("solo", "boop", 6.0).unwrap();
        assert!(matches!(
            outcome,
            CommandOutcome::RoundCompleted {
                stage_cleared: 1,
                ..
            }
        ));

        let view = session.snapshot();
        assert_eq!(view.stage, 2);
        assert!(view.between_rounds);
        assert_approx_eq!(view.last_round_reward, 5.0);
        assert_approx_eq!(view.currency, 5.0);
    }

    /// Completion happens exactly at the threshold, for several stages
    #[test]
    fn completion_exactly_at_threshold() {
        let (mut session, clock) = new_session();
        session.on_participant_join("a", false).unwrap();
        session.on_participant_join("b", false).unwrap();

        for stage in 1..=4u32 {
            let threshold = stage * 10;
            assert_eq!(session.snapshot().threshold, threshold);

            for _ in 0..threshold - 1 {
                assert_eq!(
                    session.on_command("a", "boop", 1.0),
                    Ok(CommandOutcome::Contributed)
                );
            }
            assert!(!session.is_between_rounds());

            clock.advance(2_000);
            assert!(matches!(
                session.on_command("b", "boop", 1.0),
                Ok(CommandOutcome::RoundCompleted { .. })
            ));

            let view = session.snapshot();
            assert!(view.between_rounds);
            assert_eq!(view.round_contribution, threshold);
            assert!(view.roles.iter().all(|r| !r.ready));

            session.on_command("a", "ready", 0.0).unwrap();
            session.on_command("b", "ready", 0.0).unwrap();
            assert_eq!(session.snapshot().round_contribution, 0);
        }

        let view = session.snapshot();
        assert_eq!(view.stage, 5);
        assert_eq!(view.rounds_completed, 4);
        // Each stage: (10n / 40) / 2s * 100
        assert_approx_eq!(view.currency, 12.5 + 25.0 + 37.5 + 50.0, 1e-9);
        assert_eq!(view.lifetime_contribution, 100);
    }

    /// Two of four roles filled: both ready restarts the round
    #[test]
    fn partial_roster_ready_restarts() {
        let (mut session, _) = new_session();
        session.on_participant_join("a", false).unwrap();
        session.on_participant_join("b", false).unwrap();
        session.on_command("a", "boop", 10.0).unwrap();

        assert_eq!(
            session.on_command("b", "ready", 0.0),
            Ok(CommandOutcome::Ready)
        );
        assert_eq!(
            session.on_command("a", "ready", 0.0),
            Ok(CommandOutcome::RoundStarted { stage: 2 })
        );
    }

    /// Contributions from roleless participants never count
    #[test]
    fn roleless_contributions_never_count() {
        let (mut session, _) = new_session();
        session.on_participant_join("player", false).unwrap();
        session.on_participant_join("watcher", true).unwrap();

        for participant in ["watcher", "stranger"] {
            assert!(matches!(
                session.on_command(participant, "boop", 50.0),
                Err(SessionError::NoRoleAssigned { .. })
            ));
        }

        let view = session.snapshot();
        assert_eq!(view.round_contribution, 0);
        assert_eq!(view.lifetime_contribution, 0);
        assert!(!view.between_rounds);
    }

    /// Instant completion yields a finite reward
    #[test]
    fn zero_elapsed_round_has_finite_reward() {
        let (mut session, _) = new_session();
        session.on_participant_join("a", false).unwrap();

        match session.on_command("a", "boop", 10.0).unwrap() {
            CommandOutcome::RoundCompleted { reward, .. } => {
                assert!(reward.is_finite());
                assert!(reward > 0.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(session.snapshot().currency.is_finite());
    }

    /// A lobby stays stalled until a missing player leaves
    #[test]
    fn departure_unblocks_stalled_lobby() {
        let (mut session, _) = new_session();
        for participant in ["a", "b", "c"] {
            session.on_participant_join(participant, false).unwrap();
        }
        session.on_command("a", "boop", 10.0).unwrap();
        session.on_command("a", "ready", 0.0).unwrap();
        session.on_command("b", "ready", 0.0).unwrap();
        assert!(session.is_between_rounds());

        session.on_participant_leave("c");
        assert!(!session.is_between_rounds());
        assert_eq!(session.snapshot().threshold, 20);
    }
}

/// SESSION HOST TESTS
mod host_tests {
    use super::*;

    /// Two sessions running side by side do not see each other's events
    #[tokio::test]
    async fn sessions_are_isolated() {
        let (first, _) = new_session();
        let (second, _) = new_session();
        let first = SessionHandle::spawn(first);
        let second = SessionHandle::spawn(second);

        assert_eq!(
            first.join("a", false).await,
            Ok(JoinOutcome::Player(Role::Booster))
        );
        assert_eq!(
            second.join("a", false).await,
            Ok(JoinOutcome::Player(Role::Booster))
        );

        first.send("a", ClientMessage::new("boop", 10.0)).unwrap();
        second.send("a", ClientMessage::new("boop", 3.0)).unwrap();

        let first = first.shutdown().await.unwrap().snapshot();
        let second = second.shutdown().await.unwrap().snapshot();
        assert!(first.between_rounds);
        assert_eq!(first.stage, 2);
        assert!(!second.between_rounds);
        assert_eq!(second.round_contribution, 3);
    }

    /// Published snapshots survive a JSON and bincode round through the wire
    #[test]
    fn published_snapshot_encodes() {
        tokio_test::block_on(async {
            let (session, _) = new_session();
            let handle = SessionHandle::spawn(session);
            handle.join("a", false).await.unwrap();
            handle.join("b", true).await.unwrap();

            let view = handle.snapshot();
            let json = serde_json::to_value(&view).unwrap();
            assert_eq!(json["roles"][0]["role"], "booster");
            assert_eq!(json["roles"][0]["holder"], "a");
            assert_eq!(json["spectators"][0], "b");

            let decoded = StateView::decode(&view.encode().unwrap()).unwrap();
            assert_eq!(decoded, view);

            handle.shutdown().await.unwrap();
        });
    }

    /// Subscribers see the channel close once the session stops
    #[tokio::test]
    async fn shutdown_closes_snapshot_channel() {
        let (session, _) = new_session();
        let handle = SessionHandle::spawn(session);
        let observer = handle.subscribe();
        handle.shutdown().await.unwrap();

        assert!(observer.has_changed().is_err());
    }
}
