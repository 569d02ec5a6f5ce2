use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::types::db::incident_audit_entry;

/// New audit row; the anonymity decision about `ip_address` has already been
/// made by the audit logger before this struct is built
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub incident_id: String,
    pub actor_id: Option<String>,
    pub action_type: String,
    pub description: String,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Repository for audit entry storage operations
///
/// Append-only by construction: this store exposes insert and query, nothing
/// else. No application code path can mutate or delete an entry.
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    /// Create a new AuditStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Write an audit entry to the database
    pub async fn insert(
        &self,
        entry: NewAuditEntry,
    ) -> Result<incident_audit_entry::Model, InternalError> {
        let model = incident_audit_entry::ActiveModel {
            id: sea_orm::ActiveValue::NotSet, // auto-increment
            incident_id: Set(entry.incident_id),
            actor_id: Set(entry.actor_id),
            action_type: Set(entry.action_type),
            description: Set(entry.description),
            before_state: Set(entry.before_state),
            after_state: Set(entry.after_state),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            created_at: Set(Utc::now().to_rfc3339()),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_audit_entry", e))
    }

    /// All entries for an incident, newest first
    pub async fn trail(
        &self,
        incident_id: &str,
    ) -> Result<Vec<incident_audit_entry::Model>, InternalError> {
        incident_audit_entry::Entity::find()
            .filter(incident_audit_entry::Column::IncidentId.eq(incident_id))
            .order_by_desc(incident_audit_entry::Column::CreatedAt)
            .order_by_desc(incident_audit_entry::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("audit_trail", e))
    }
}
