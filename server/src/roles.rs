//! Role slot assignment for connected participants
//!
//! This module binds participant identifiers to the four fixed role slots:
//! - First-free assignment in declaration order
//! - Slot reclamation when a participant leaves
//! - Lookup in both directions (participant to role, role to participant)
//!
//! The manager refuses to over-fill the roster; deciding what to do with an
//! overflow participant is left to the caller.

use crate::error::SessionError;
use hog_shared::{Role, MAX_PARTICIPANTS};
use log::info;
use std::collections::HashMap;

/// Tracks which participant holds which role
///
/// Both directions are stored so that lookups by participant and by slot
/// are cheap. Every mutation updates both sides together, which keeps the
/// relation a bijection between held roles and their participants.
#[derive(Debug, Default)]
pub struct RoleAssignmentManager {
    /// Holder of each slot, indexed by `Role::slot`
    holders: [Option<String>; MAX_PARTICIPANTS],
    /// Reverse index from participant to their slot
    roles: HashMap<String, Role>,
}

impl RoleAssignmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the first unfilled role to a participant
    ///
    /// Scans roles in declaration order. Fails with `AlreadyAssigned` if the
    /// participant already holds a role and with `SessionFull` if every slot
    /// is taken; in both cases nothing is changed.
    pub fn assign_unfilled_role(&mut self, participant: &str) -> Result<Role, SessionError> {
        if self.roles.contains_key(participant) {
            return Err(SessionError::AlreadyAssigned {
                participant: participant.to_string(),
            });
        }

        let role = Role::ALL
            .into_iter()
            .find(|role| self.holders[role.slot()].is_none())
            .ok_or(SessionError::SessionFull)?;

        self.holders[role.slot()] = Some(participant.to_string());
        self.roles.insert(participant.to_string(), role);
        info!("Participant {} assigned role {}", participant, role);

        Ok(role)
    }

    /// Frees the participant's role slot
    ///
    /// The slot keeps its declared position, so the next assignment picks it
    /// up again if it is the first free one. Fails with `UnknownParticipant`
    /// if the participant holds no role.
    pub fn release_role(&mut self, participant: &str) -> Result<Role, SessionError> {
        let role = self
            .roles
            .remove(participant)
            .ok_or_else(|| SessionError::UnknownParticipant {
                participant: participant.to_string(),
            })?;

        self.holders[role.slot()] = None;
        info!("Participant {} released role {}", participant, role);

        Ok(role)
    }

    pub fn role_of(&self, participant: &str) -> Option<Role> {
        self.roles.get(participant).copied()
    }

    pub fn holder_of(&self, role: Role) -> Option<&str> {
        self.holders[role.slot()].as_deref()
    }

    /// Roles that currently have a holder, in declaration order
    pub fn occupied_roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.holders[role.slot()].is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.roles.len() >= MAX_PARTICIPANTS
    }
}
