//! Centralized access control for the safety incident subsystem.
//!
//! Every authorization decision is a pure function of the actor's identity
//! and role plus a handful of incident/note facts. Nothing here touches the
//! database or session state, so the full decision matrix is unit-testable
//! with constructed fixtures.

use crate::types::db::{incident, incident_note};
use crate::types::internal::{Actor, NoteKind};

/// The incident facts access decisions depend on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessFacts {
    pub coordinator_id: Option<String>,
    pub reporter_id: Option<String>,
    pub is_anonymous: bool,
}

impl From<&incident::Model> for AccessFacts {
    fn from(model: &incident::Model) -> Self {
        Self {
            coordinator_id: model.coordinator_id.clone(),
            reporter_id: model.reporter_id.clone(),
            is_anonymous: model.is_anonymous,
        }
    }
}

/// Outcome of a manual-note edit/delete authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEditDecision {
    Allowed,
    /// System notes reject mutation unconditionally, admins included
    Immutable,
    NotOwner,
}

/// Whether the actor may see an incident at all
///
/// Precedence: administrator, then assigned coordinator, then the reporter of
/// a non-anonymous incident. Everyone else is denied.
pub fn can_access(actor: &Actor, facts: &AccessFacts) -> bool {
    if actor.is_admin {
        return true;
    }

    if facts.coordinator_id.as_deref() == Some(actor.id.as_str()) {
        return true;
    }

    if !facts.is_anonymous && facts.reporter_id.as_deref() == Some(actor.id.as_str()) {
        return true;
    }

    false
}

/// Whether the actor may see private notes on this incident
///
/// Only administrators and the incident's own coordinator; a reporter with
/// access still sees public notes only.
pub fn can_view_private_notes(actor: &Actor, facts: &AccessFacts) -> bool {
    actor.is_admin || facts.coordinator_id.as_deref() == Some(actor.id.as_str())
}

/// Filter a note list down to what the actor may see
///
/// Assumes `can_access` already passed for this actor and incident. System
/// notes are public by construction and therefore always pass the filter.
pub fn visible_notes(
    actor: &Actor,
    facts: &AccessFacts,
    notes: Vec<incident_note::Model>,
) -> Vec<incident_note::Model> {
    if can_view_private_notes(actor, facts) {
        return notes;
    }

    notes.into_iter().filter(|n| !n.is_private).collect()
}

/// Whether the actor may edit or delete a note
pub fn can_modify_note(actor: &Actor, note: &incident_note::Model) -> NoteEditDecision {
    if NoteKind::parse(&note.kind) == Some(NoteKind::System) {
        return NoteEditDecision::Immutable;
    }

    if actor.is_admin || note.author_id.as_deref() == Some(actor.id.as_str()) {
        return NoteEditDecision::Allowed;
    }

    NoteEditDecision::NotOwner
}
