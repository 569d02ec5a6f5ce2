use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::errors::internal::AuditError;
use crate::errors::InternalError;
use crate::stores::audit_store::NewAuditEntry;
use crate::stores::{AuditStore, IncidentStore};
use crate::types::internal::{AuditAction, AuditRecord, ClientMeta};

/// Audit trail writer for incident actions
///
/// The only component allowed to create audit entries. Before each write it
/// re-reads the target incident's anonymity flag and, when the incident is
/// anonymous, drops the client IP no matter what the caller supplied. The
/// flag is never cached across writes because it guards a privacy guarantee.
pub struct AuditLogger {
    audit_store: Arc<AuditStore>,
    incident_store: Arc<IncidentStore>,
}

impl AuditLogger {
    /// Create a new AuditLogger
    pub fn new(audit_store: Arc<AuditStore>, incident_store: Arc<IncidentStore>) -> Self {
        Self {
            audit_store,
            incident_store,
        }
    }

    /// Write an audit entry for an incident action
    ///
    /// # Errors
    /// Returns `InternalError` if the incident does not exist or the insert
    /// fails. Most callers want [`record`](Self::record) instead, which
    /// swallows failures.
    pub async fn log_action(
        &self,
        incident_id: &str,
        actor_id: Option<&str>,
        action: AuditAction,
        description: &str,
        before: Option<Value>,
        after: Option<Value>,
        meta: &ClientMeta,
    ) -> Result<(), InternalError> {
        let is_anonymous = self
            .incident_store
            .is_anonymous(incident_id)
            .await?
            .ok_or_else(|| AuditError::IncidentMissing(incident_id.to_string()))?;

        // Anonymity invariant: no IP is ever stored for anonymous incidents,
        // at creation or at any later point in the record's life.
        let ip_address = if is_anonymous {
            None
        } else {
            meta.ip_address.clone()
        };

        let entry = NewAuditEntry {
            incident_id: incident_id.to_string(),
            actor_id: actor_id.map(|a| a.to_string()),
            action_type: action.as_str().to_string(),
            description: description.to_string(),
            before_state: Self::serialize_state(before),
            after_state: Self::serialize_state(after),
            ip_address,
            user_agent: meta.user_agent.clone(),
        };

        self.audit_store.insert(entry).await?;

        Ok(())
    }

    /// Best-effort variant of [`log_action`](Self::log_action)
    ///
    /// Audit writes are a non-critical side effect of the business operation
    /// that triggered them: any failure is logged and swallowed so the
    /// primary workflow never aborts because its trail entry could not be
    /// written.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        incident_id: &str,
        actor_id: Option<&str>,
        action: AuditAction,
        description: &str,
        before: Option<Value>,
        after: Option<Value>,
        meta: &ClientMeta,
    ) {
        if let Err(err) = self
            .log_action(incident_id, actor_id, action, description, before, after, meta)
            .await
        {
            tracing::warn!(
                incident_id,
                error = %err,
                "audit write failed; continuing without trail entry"
            );
        }
    }

    /// Serialize a before/after snapshot leniently
    ///
    /// A value that cannot be serialized degrades to no snapshot; it must
    /// never block the primary write of action type and description.
    pub fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize audit snapshot");
                None
            }
        }
    }

    fn serialize_state(state: Option<Value>) -> Option<String> {
        state.and_then(|v| match serde_json::to_string(&v) {
            Ok(s) => Some(s),
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize audit state");
                None
            }
        })
    }

    /// Full trail for an incident, newest first
    pub async fn trail(&self, incident_id: &str) -> Result<Vec<AuditRecord>, InternalError> {
        let entries = self.audit_store.trail(incident_id).await?;

        Ok(entries
            .into_iter()
            .map(|e| AuditRecord {
                id: e.id,
                incident_id: e.incident_id,
                actor_id: e.actor_id,
                action: e.action_type,
                description: e.description,
                before_state: e.before_state,
                after_state: e.after_state,
                ip_address: e.ip_address,
                user_agent: e.user_agent,
                created_at: e.created_at,
            })
            .collect())
    }
}
