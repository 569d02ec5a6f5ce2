use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::incident_note;
use crate::types::internal::NoteKind;

/// New note row ready for insertion; content is already encrypted
#[derive(Debug, Clone)]
pub struct NewNote {
    pub incident_id: String,
    pub encrypted_content: String,
    pub kind: NoteKind,
    pub is_private: bool,
    pub author_id: Option<String>,
    pub tags: Option<String>,
}

/// Repository for incident note storage operations
pub struct NoteStore {
    db: DatabaseConnection,
}

impl NoteStore {
    /// Create a new NoteStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The store's own connection, for inserts outside any transaction
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert a note on a caller-owned connection
    ///
    /// Accepts `&impl ConnectionTrait` so system notes can be written inside
    /// the same transaction as the incident change they describe.
    pub async fn insert<C: ConnectionTrait>(
        &self,
        conn: &C,
        new: NewNote,
    ) -> Result<incident_note::Model, InternalError> {
        let model = incident_note::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            incident_id: Set(new.incident_id),
            encrypted_content: Set(new.encrypted_content),
            kind: Set(new.kind.as_str().to_string()),
            is_private: Set(new.is_private),
            author_id: Set(new.author_id),
            tags: Set(new.tags),
            created_at: Set(Utc::now().to_rfc3339()),
            updated_at: Set(None),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_note", e))
    }

    pub async fn find_by_id(
        &self,
        id: &str,
    ) -> Result<Option<incident_note::Model>, InternalError> {
        incident_note::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_note_by_id", e))
    }

    /// All notes for an incident, newest first
    pub async fn list_for_incident(
        &self,
        incident_id: &str,
    ) -> Result<Vec<incident_note::Model>, InternalError> {
        incident_note::Entity::find()
            .filter(incident_note::Column::IncidentId.eq(incident_id))
            .order_by_desc(incident_note::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_notes", e))
    }

    /// Update a manual note's content, privacy flag, and tags
    pub async fn update_manual(
        &self,
        note: incident_note::Model,
        encrypted_content: String,
        is_private: bool,
        tags: Option<String>,
    ) -> Result<incident_note::Model, InternalError> {
        let mut model = note.into_active_model();
        model.encrypted_content = Set(encrypted_content);
        model.is_private = Set(is_private);
        model.tags = Set(tags);
        model.updated_at = Set(Some(Utc::now().to_rfc3339()));

        model
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_note", e))
    }

    pub async fn delete(&self, note: incident_note::Model) -> Result<(), InternalError> {
        note.delete(&self.db)
            .await
            .map_err(|e| InternalError::database("delete_note", e))?;

        Ok(())
    }

    pub async fn count_for_incident(&self, incident_id: &str) -> Result<u64, InternalError> {
        incident_note::Entity::find()
            .filter(incident_note::Column::IncidentId.eq(incident_id))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_notes", e))
    }
}
