use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::errors::api::safety::SafetyError;
use crate::policy::{self, AccessFacts, NoteEditDecision};
use crate::services::EncryptionService;
use crate::stores::note_store::NewNote;
use crate::stores::{IncidentStore, NoteStore};
use crate::types::db::{incident, incident_note};
use crate::types::internal::{Actor, AuditAction, ClientMeta, NoteKind};

/// Decrypted view of a note the actor is allowed to see
#[derive(Debug, Clone)]
pub struct NoteView {
    pub id: String,
    pub incident_id: String,
    pub content: String,
    pub kind: String,
    pub is_private: bool,
    pub author_id: Option<String>,
    pub tags: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Notes service for manual coordinator/admin notes on incidents
///
/// System notes are written by the lifecycle operations themselves; this
/// service only ever reads them, and refuses to change them for anyone.
pub struct NotesService {
    incident_store: Arc<IncidentStore>,
    note_store: Arc<NoteStore>,
    audit_logger: Arc<AuditLogger>,
    encryption: Arc<EncryptionService>,
}

impl NotesService {
    /// Create NotesService from AppData
    pub fn new(app_data: Arc<crate::app_data::AppData>) -> Self {
        Self {
            incident_store: app_data.incident_store.clone(),
            note_store: app_data.note_store.clone(),
            audit_logger: app_data.audit_logger.clone(),
            encryption: app_data.encryption_service.clone(),
        }
    }

    /// List the notes the actor may see on an incident, newest first
    pub async fn list_notes(
        &self,
        actor: &Actor,
        incident_id: &str,
    ) -> Result<Vec<NoteView>, SafetyError> {
        let incident = self.load_authorized(actor, incident_id).await?;
        let facts = AccessFacts::from(&incident);

        let notes = self.note_store.list_for_incident(&incident.id).await?;
        let visible = policy::visible_notes(actor, &facts, notes);

        Ok(visible.into_iter().map(|n| self.to_view(n)).collect())
    }

    /// Add a manual note
    ///
    /// Marking a note private requires private-note visibility; a reporter
    /// with plain access can only leave public notes.
    pub async fn add_note(
        &self,
        actor: &Actor,
        incident_id: &str,
        content: &str,
        is_private: bool,
        tags: Option<String>,
        meta: &ClientMeta,
    ) -> Result<NoteView, SafetyError> {
        let incident = self.load_authorized(actor, incident_id).await?;

        if content.trim().is_empty() {
            return Err(SafetyError::validation("Note content is required"));
        }

        if is_private && !policy::can_view_private_notes(actor, &AccessFacts::from(&incident)) {
            return Err(SafetyError::access_denied());
        }

        let encrypted = self
            .encryption
            .encrypt(content)
            .map_err(crate::errors::InternalError::from)?;

        let note = self
            .note_store
            .insert(
                self.note_store.connection(),
                NewNote {
                    incident_id: incident.id.clone(),
                    encrypted_content: encrypted,
                    kind: NoteKind::Manual,
                    is_private,
                    author_id: Some(actor.id.clone()),
                    tags: normalize_tags(tags),
                },
            )
            .await?;

        self.audit_logger
            .record(
                &incident.id,
                Some(&actor.id),
                AuditAction::NoteAdded,
                &format!("Note added by {}", actor.label()),
                None,
                // Snapshots never carry note plaintext
                AuditLogger::snapshot(&serde_json::json!({
                    "note_id": note.id,
                    "is_private": note.is_private,
                })),
                meta,
            )
            .await;

        Ok(self.to_view(note))
    }

    /// Update a manual note's content, privacy flag, or tags
    ///
    /// Author-or-admin only; system notes are immutable for everyone.
    pub async fn update_note(
        &self,
        actor: &Actor,
        note_id: &str,
        content: &str,
        is_private: bool,
        tags: Option<String>,
        meta: &ClientMeta,
    ) -> Result<NoteView, SafetyError> {
        let (incident, note) = self.load_note_authorized(actor, note_id).await?;
        self.check_modifiable(actor, &note)?;

        if content.trim().is_empty() {
            return Err(SafetyError::validation("Note content is required"));
        }

        if is_private && !policy::can_view_private_notes(actor, &AccessFacts::from(&incident)) {
            return Err(SafetyError::access_denied());
        }

        let before = AuditLogger::snapshot(&serde_json::json!({
            "note_id": note.id,
            "is_private": note.is_private,
            "tags": note.tags,
        }));

        let encrypted = self
            .encryption
            .encrypt(content)
            .map_err(crate::errors::InternalError::from)?;

        let updated = self
            .note_store
            .update_manual(note, encrypted, is_private, normalize_tags(tags))
            .await?;

        self.audit_logger
            .record(
                &incident.id,
                Some(&actor.id),
                AuditAction::NoteUpdated,
                &format!("Note updated by {}", actor.label()),
                before,
                AuditLogger::snapshot(&serde_json::json!({
                    "note_id": updated.id,
                    "is_private": updated.is_private,
                    "tags": updated.tags,
                })),
                meta,
            )
            .await;

        Ok(self.to_view(updated))
    }

    /// Delete a manual note (author-or-admin; system notes never)
    pub async fn delete_note(
        &self,
        actor: &Actor,
        note_id: &str,
        meta: &ClientMeta,
    ) -> Result<(), SafetyError> {
        let (incident, note) = self.load_note_authorized(actor, note_id).await?;
        self.check_modifiable(actor, &note)?;

        let before = AuditLogger::snapshot(&serde_json::json!({
            "note_id": note.id,
            "is_private": note.is_private,
        }));

        self.note_store.delete(note).await?;

        self.audit_logger
            .record(
                &incident.id,
                Some(&actor.id),
                AuditAction::NoteDeleted,
                &format!("Note deleted by {}", actor.label()),
                before,
                None,
                meta,
            )
            .await;

        Ok(())
    }

    fn check_modifiable(
        &self,
        actor: &Actor,
        note: &incident_note::Model,
    ) -> Result<(), SafetyError> {
        match policy::can_modify_note(actor, note) {
            NoteEditDecision::Allowed => Ok(()),
            NoteEditDecision::Immutable => Err(SafetyError::note_immutable()),
            NoteEditDecision::NotOwner => Err(SafetyError::access_denied()),
        }
    }

    async fn load_authorized(
        &self,
        actor: &Actor,
        incident_id: &str,
    ) -> Result<incident::Model, SafetyError> {
        let incident = self
            .incident_store
            .find_by_id(incident_id)
            .await?
            .ok_or_else(SafetyError::not_found)?;

        if !policy::can_access(actor, &AccessFacts::from(&incident)) {
            return Err(SafetyError::access_denied());
        }

        Ok(incident)
    }

    async fn load_note_authorized(
        &self,
        actor: &Actor,
        note_id: &str,
    ) -> Result<(incident::Model, incident_note::Model), SafetyError> {
        let note = self
            .note_store
            .find_by_id(note_id)
            .await?
            .ok_or_else(SafetyError::not_found)?;

        let incident = self.load_authorized(actor, &note.incident_id).await?;

        Ok((incident, note))
    }

    fn to_view(&self, note: incident_note::Model) -> NoteView {
        NoteView {
            content: self
                .encryption
                .decrypt_or_placeholder(&note.encrypted_content),
            id: note.id,
            incident_id: note.incident_id,
            kind: note.kind,
            is_private: note.is_private,
            author_id: note.author_id,
            tags: note.tags,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

fn normalize_tags(tags: Option<String>) -> Option<String> {
    tags.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "notes_service_tests.rs"]
mod notes_service_tests;
