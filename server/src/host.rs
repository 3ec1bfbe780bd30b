//! Per-session event loop
//!
//! Each session runs in its own task and owns its `GameSession` outright.
//! Events reach it through an unbounded channel and are applied one at a time
//! in arrival order, so no two events ever mutate the same session
//! concurrently. After every event the task publishes the latest `StateView`
//! on a watch channel for whatever broadcasts state to participants.
//! Separate sessions share nothing and need no locking between them.

use crate::error::SessionError;
use crate::session::{GameSession, JoinOutcome};
use hog_shared::{ClientMessage, StateView};
use log::{debug, error, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// Events delivered from the transport layer to a session task
#[derive(Debug)]
pub enum SessionEvent {
    Join {
        participant: String,
        spectator: bool,
        reply: oneshot::Sender<Result<JoinOutcome, SessionError>>,
    },
    Leave {
        participant: String,
    },
    Message {
        participant: String,
        message: ClientMessage,
    },
    Shutdown,
}

/// Handle to a running session task
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<StateView>,
    task: JoinHandle<GameSession>,
}

impl SessionHandle {
    /// Moves the session into a new task. Must be called inside a tokio runtime.
    pub fn spawn(session: GameSession) -> Self {
        let (events, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(session.snapshot());
        let task = tokio::spawn(run_session(session, event_rx, snapshot_tx));

        Self {
            events,
            snapshots,
            task,
        }
    }

    /// Asks the session to admit a participant and waits for its answer
    pub async fn join(
        &self,
        participant: &str,
        spectator: bool,
    ) -> Result<JoinOutcome, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send_event(SessionEvent::Join {
            participant: participant.to_string(),
            spectator,
            reply,
        })?;
        response.await.map_err(|_| SessionError::SessionClosed)?
    }

    pub fn leave(&self, participant: &str) -> Result<(), SessionError> {
        self.send_event(SessionEvent::Leave {
            participant: participant.to_string(),
        })
    }

    pub fn send(&self, participant: &str, message: ClientMessage) -> Result<(), SessionError> {
        self.send_event(SessionEvent::Message {
            participant: participant.to_string(),
            message,
        })
    }

    fn send_event(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.events
            .send(event)
            .map_err(|_| SessionError::SessionClosed)
    }

    /// Latest state published by the session task
    pub fn snapshot(&self) -> StateView {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StateView> {
        self.snapshots.clone()
    }

    /// Stops the task after it drains the events already queued and returns
    /// the session as it was left.
    pub async fn shutdown(self) -> Result<GameSession, SessionError> {
        // The task may already be gone; the join below reports that.
        let _ = self.events.send(SessionEvent::Shutdown);
        self.task.await.map_err(|e| {
            error!("Session task failed: {}", e);
            SessionError::SessionClosed
        })
    }
}

async fn run_session(
    mut session: GameSession,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    snapshots: watch::Sender<StateView>,
) -> GameSession {
    info!("Session started");

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Join {
                participant,
                spectator,
                reply,
            } => {
                let result = session.on_participant_join(&participant, spectator);
                if let Err(e) = &result {
                    info!("Refused join from {}: {}", participant, e);
                }
                // Publish first so the joiner never observes a stale view
                publish(&session, &snapshots);
                if reply.send(result).is_err() {
                    debug!("Join requester for {} went away", participant);
                }
            }
            SessionEvent::Leave { participant } => {
                session.on_participant_leave(&participant);
                publish(&session, &snapshots);
            }
            SessionEvent::Message {
                participant,
                message,
            } => {
                // Errors are already logged by the session and never reach the sender
                let _ = session.on_message(&participant, &message);
                publish(&session, &snapshots);
            }
            SessionEvent::Shutdown => {
                info!("Session shutting down");
                break;
            }
        }
    }

    session
}

/// Replaces the published view, waking subscribers only if something changed
fn publish(session: &GameSession, snapshots: &watch::Sender<StateView>) {
    let view = session.snapshot();
    snapshots.send_if_modified(|current| {
        if *current == view {
            false
        } else {
            *current = view;
            true
        }
    });
}
