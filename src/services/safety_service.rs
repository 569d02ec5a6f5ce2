use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::audit::AuditLogger;
use crate::errors::api::safety::SafetyError;
use crate::errors::internal::DatabaseError;
use crate::policy::{self, AccessFacts};
use crate::services::reference::{self, ReferenceNumberGenerator};
use crate::services::EncryptionService;
use crate::stores::incident_store::NewIncident;
use crate::stores::note_store::NewNote;
use crate::stores::{IncidentStore, NoteStore};
use crate::types::db::incident;
use crate::types::internal::{
    Actor, AuditAction, AuditRecord, ClientMeta, IncidentFilter, IncidentSeverity, IncidentSort,
    IncidentStatus, IncidentType, NoteKind, SortOrder,
};

/// Bounded description preview lengths for list and dashboard rows
const LIST_PREVIEW_CHARS: usize = 200;
const DASHBOARD_PREVIEW_CHARS: usize = 100;

const DASHBOARD_RECENT_LIMIT: u64 = 5;
const STALE_UNASSIGNED_DAYS: i64 = 7;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Plaintext submission as received from the reporting form
#[derive(Debug, Clone, Default)]
pub struct SubmitIncident {
    pub title: Option<String>,
    pub severity: String,
    pub incident_type: String,
    pub location: String,
    pub incident_date: String,
    pub description: String,
    pub involved_parties: Option<String>,
    pub witnesses: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_anonymous: bool,
    pub request_follow_up: bool,
    pub reporter_id: Option<String>,
}

/// What the reporter gets back after a successful submission
///
/// Deliberately contains no sensitive content; the reference number and
/// tracking URL are all a reporter needs for the public status lookup.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub incident_id: String,
    pub reference_number: String,
    pub tracking_url: String,
}

/// Minimal public view for the reference-number status lookup
#[derive(Debug, Clone)]
pub struct StatusView {
    pub reference_number: String,
    pub status: String,
    pub reported_at: String,
    pub last_updated: String,
    pub can_follow_up: bool,
}

/// Full decrypted view for authorized staff
#[derive(Debug, Clone)]
pub struct IncidentDetail {
    pub id: String,
    pub reference_number: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub location: String,
    pub incident_date: String,
    pub reported_at: String,
    pub status: String,
    pub description: String,
    pub involved_parties: Option<String>,
    pub witnesses: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_anonymous: bool,
    pub request_follow_up: bool,
    pub coordinator_id: Option<String>,
    pub external_folder_url: Option<String>,
    pub external_report_url: Option<String>,
    pub updated_at: String,
    pub audit_trail: Vec<AuditRecord>,
}

/// One row of the staff incident list
#[derive(Debug, Clone)]
pub struct IncidentSummary {
    pub id: String,
    pub reference_number: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub status: String,
    pub location: String,
    pub incident_date: String,
    pub reported_at: String,
    pub coordinator_id: Option<String>,
    pub is_anonymous: bool,
    pub description_preview: String,
    pub note_count: u64,
}

/// A page of incident summaries plus the pre-pagination total
#[derive(Debug, Clone)]
pub struct IncidentPage {
    pub items: Vec<IncidentSummary>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Raw listing parameters as received from the query string
///
/// Parsed leniently: unknown status/type tokens are dropped, unknown sort
/// keys fall back to reported-at descending.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub statuses: Option<String>,
    pub types: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub coordinator_id: Option<String>,
    pub unassigned_only: bool,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Coordinator-facing dashboard numbers
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub unassigned_open: u64,
    pub has_stale_unassigned: bool,
    pub recent_open: Vec<IncidentSummary>,
}

/// Reduced projection of a reporter's own incident
///
/// Excludes the reference number, coordinator identity, notes, and external
/// links; a reporter tracks progress, they do not work the case.
#[derive(Debug, Clone)]
pub struct MyReportSummary {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub status: String,
    pub incident_date: String,
    pub reported_at: String,
}

#[derive(Debug, Clone)]
pub struct MyReportPage {
    pub items: Vec<MyReportSummary>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone)]
pub struct MyReportDetail {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub location: String,
    pub incident_date: String,
    pub status: String,
    pub reported_at: String,
    pub description: String,
    pub request_follow_up: bool,
}

/// Safety service that orchestrates the incident lifecycle
///
/// Coordinates IncidentStore, NoteStore, the audit logger, and field
/// encryption. Authorization goes through the policy module before any
/// decryption happens; internal failures are logged and surfaced as the
/// generic API error taxonomy.
pub struct SafetyService {
    db: DatabaseConnection,
    incident_store: Arc<IncidentStore>,
    note_store: Arc<NoteStore>,
    audit_logger: Arc<AuditLogger>,
    encryption: Arc<EncryptionService>,
    reference_generator: Arc<dyn ReferenceNumberGenerator>,
}

impl SafetyService {
    /// Create SafetyService from AppData
    pub fn new(app_data: Arc<crate::app_data::AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            incident_store: app_data.incident_store.clone(),
            note_store: app_data.note_store.clone(),
            audit_logger: app_data.audit_logger.clone(),
            encryption: app_data.encryption_service.clone(),
            reference_generator: app_data.reference_generator.clone(),
        }
    }

    /// Accept a new incident report
    ///
    /// Sensitive fields are encrypted independently before storage. Anonymous
    /// submissions never record a reporter or creator, and their "Created"
    /// audit entry carries no actor or client IP.
    pub async fn submit(
        &self,
        submission: SubmitIncident,
        meta: &ClientMeta,
    ) -> Result<SubmissionReceipt, SafetyError> {
        let severity = IncidentSeverity::parse(&submission.severity)
            .ok_or_else(|| SafetyError::validation("Unknown severity"))?;
        let incident_type = IncidentType::parse(&submission.incident_type)
            .ok_or_else(|| SafetyError::validation("Unknown incident type"))?;

        if submission.description.trim().is_empty() {
            return Err(SafetyError::validation("Description is required"));
        }
        if submission.location.trim().is_empty() {
            return Err(SafetyError::validation("Location is required"));
        }

        let incident_date = normalize_incident_date(&submission.incident_date)?;
        if incident_date > Utc::now() {
            return Err(SafetyError::validation(
                "Incident date cannot be in the future",
            ));
        }
        let incident_date = incident_date.to_rfc3339();

        let title = match submission.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("{} - {}", incident_type, &incident_date[..10]),
        };

        // Anonymity is decided here, once, for the lifetime of the record
        let reporter_id = if submission.is_anonymous {
            None
        } else {
            submission.reporter_id.clone()
        };

        let reference_number =
            reference::unique_reference(self.reference_generator.as_ref(), &self.incident_store)
                .await?;

        let new = NewIncident {
            reference_number: reference_number.clone(),
            title,
            severity: severity.as_str().to_string(),
            incident_type: incident_type.as_str().to_string(),
            location: submission.location.trim().to_string(),
            incident_date,
            encrypted_description: self
                .encryption
                .encrypt(&submission.description)
                .map_err(crate::errors::InternalError::from)?,
            encrypted_involved_parties: self
                .encryption
                .encrypt_opt(submission.involved_parties.as_deref())
                .map_err(crate::errors::InternalError::from)?,
            encrypted_witnesses: self
                .encryption
                .encrypt_opt(submission.witnesses.as_deref())
                .map_err(crate::errors::InternalError::from)?,
            encrypted_contact_email: self
                .encryption
                .encrypt_opt(submission.contact_email.as_deref())
                .map_err(crate::errors::InternalError::from)?,
            encrypted_contact_phone: self
                .encryption
                .encrypt_opt(submission.contact_phone.as_deref())
                .map_err(crate::errors::InternalError::from)?,
            is_anonymous: submission.is_anonymous,
            request_follow_up: submission.request_follow_up,
            reporter_id: reporter_id.clone(),
            status: IncidentStatus::New.as_str().to_string(),
        };

        let stored = self.incident_store.insert(new).await?;

        self.audit_logger
            .record(
                &stored.id,
                reporter_id.as_deref(),
                AuditAction::Created,
                &format!("Incident {} reported", stored.reference_number),
                None,
                AuditLogger::snapshot(&serde_json::json!({ "status": stored.status })),
                meta,
            )
            .await;

        tracing::info!(
            incident_id = %stored.id,
            reference = %stored.reference_number,
            anonymous = stored.is_anonymous,
            "incident submitted"
        );

        Ok(SubmissionReceipt {
            tracking_url: format!("/safety/status/{}", stored.reference_number),
            incident_id: stored.id,
            reference_number: stored.reference_number,
        })
    }

    /// Public status lookup by reference number
    ///
    /// Unknown references produce the same NotFound as everything else; the
    /// endpoint gives no signal usable for reference enumeration.
    pub async fn status_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<StatusView, SafetyError> {
        let incident = self
            .incident_store
            .find_by_reference(reference_number.trim())
            .await?
            .ok_or_else(SafetyError::not_found)?;

        Ok(StatusView {
            reference_number: incident.reference_number,
            status: incident.status,
            reported_at: incident.reported_at,
            last_updated: incident.updated_at,
            can_follow_up: incident.request_follow_up && !incident.is_anonymous,
        })
    }

    /// Full decrypted detail for the admin or the assigned coordinator
    ///
    /// The staff projection carries the coordinator identity, external links,
    /// and the complete audit trail, so a reporter never gets it; their own
    /// incidents go through [`Self::my_report_detail`]. The policy check
    /// happens before any ciphertext is touched. A field that fails to
    /// decrypt degrades to a placeholder rather than failing the whole
    /// response. Successful reads leave a "Viewed" trail entry.
    pub async fn incident_detail(
        &self,
        actor: &Actor,
        incident_id: &str,
        meta: &ClientMeta,
    ) -> Result<IncidentDetail, SafetyError> {
        let incident = self.load_for_coordination(actor, incident_id).await?;

        let detail = IncidentDetail {
            description: self
                .encryption
                .decrypt_or_placeholder(&incident.encrypted_description),
            involved_parties: self
                .encryption
                .decrypt_opt_or_placeholder(incident.encrypted_involved_parties.as_deref()),
            witnesses: self
                .encryption
                .decrypt_opt_or_placeholder(incident.encrypted_witnesses.as_deref()),
            contact_email: self
                .encryption
                .decrypt_opt_or_placeholder(incident.encrypted_contact_email.as_deref()),
            contact_phone: self
                .encryption
                .decrypt_opt_or_placeholder(incident.encrypted_contact_phone.as_deref()),
            audit_trail: self.audit_logger.trail(&incident.id).await?,
            id: incident.id.clone(),
            reference_number: incident.reference_number,
            title: incident.title,
            severity: incident.severity,
            incident_type: incident.incident_type,
            location: incident.location,
            incident_date: incident.incident_date,
            reported_at: incident.reported_at,
            status: incident.status,
            is_anonymous: incident.is_anonymous,
            request_follow_up: incident.request_follow_up,
            coordinator_id: incident.coordinator_id,
            external_folder_url: incident.external_folder_url,
            external_report_url: incident.external_report_url,
            updated_at: incident.updated_at,
        };

        self.audit_logger
            .record(
                &detail.id,
                Some(&actor.id),
                AuditAction::Viewed,
                &format!("Incident viewed by {}", actor.label()),
                None,
                None,
                meta,
            )
            .await;

        Ok(detail)
    }

    /// Assign, reassign, or unassign the coordinator (admin only)
    ///
    /// The incident update and its system note are committed atomically; the
    /// audit entry follows best-effort after the commit.
    pub async fn assign_coordinator(
        &self,
        actor: &Actor,
        incident_id: &str,
        coordinator_id: Option<String>,
        coordinator_name: Option<String>,
        meta: &ClientMeta,
    ) -> Result<(), SafetyError> {
        if !actor.is_admin {
            return Err(SafetyError::access_denied());
        }

        let incident = self
            .incident_store
            .find_by_id(incident_id)
            .await?
            .ok_or_else(SafetyError::not_found)?;

        let coordinator_id = coordinator_id.filter(|c| !c.trim().is_empty());
        let previous = incident.coordinator_id.clone();
        let new_label = coordinator_name
            .as_deref()
            .or(coordinator_id.as_deref())
            .unwrap_or("");

        let note_text = match (previous.as_deref(), coordinator_id.as_deref()) {
            (None, Some(_)) => format!("Assigned to {} by {}", new_label, actor.label()),
            (Some(old), None) => format!("Unassigned from {} by {}", old, actor.label()),
            (Some(old), Some(_)) => format!(
                "Coordinator changed from {} to {} by {}",
                old,
                new_label,
                actor.label()
            ),
            (None, None) => format!("Coordinator cleared by {}", actor.label()),
        };

        let before = AuditLogger::snapshot(&serde_json::json!({ "coordinator_id": previous }));
        let after =
            AuditLogger::snapshot(&serde_json::json!({ "coordinator_id": coordinator_id }));

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| crate::errors::InternalError::from(DatabaseError::TransactionBegin { source: e }))?;

        self.incident_store
            .set_coordinator(&txn, incident, coordinator_id, &actor.id)
            .await?;
        self.write_system_note(&txn, incident_id, &note_text).await?;

        txn.commit()
            .await
            .map_err(|e| crate::errors::InternalError::from(DatabaseError::TransactionCommit { source: e }))?;

        self.audit_logger
            .record(
                incident_id,
                Some(&actor.id),
                AuditAction::Assigned,
                &note_text,
                before,
                after,
                meta,
            )
            .await;

        Ok(())
    }

    /// Move an incident to a new workflow status
    ///
    /// Coordinator-or-admin. Transitions out of Closed or Archived are
    /// refused; every accepted change produces exactly one system note and
    /// one "StatusChanged" audit entry.
    pub async fn update_status(
        &self,
        actor: &Actor,
        incident_id: &str,
        new_status: &str,
        reason: Option<&str>,
        meta: &ClientMeta,
    ) -> Result<(), SafetyError> {
        let incident = self.load_for_coordination(actor, incident_id).await?;

        let new_status = IncidentStatus::parse(new_status)
            .ok_or_else(|| SafetyError::validation("Unknown status"))?;

        let current = IncidentStatus::parse(&incident.status);
        if current.map(|s| s.is_terminal()).unwrap_or(false) {
            return Err(SafetyError::validation(
                "Closed or archived incidents cannot change status",
            ));
        }

        let old_status = incident.status.clone();
        let mut note_text = format!(
            "Status changed from {} to {} by {}",
            old_status,
            new_status,
            actor.label()
        );
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            note_text.push_str(&format!(". Reason: {}", reason));
        }

        let before = AuditLogger::snapshot(&serde_json::json!({ "status": old_status }));
        let after =
            AuditLogger::snapshot(&serde_json::json!({ "status": new_status.as_str() }));

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| crate::errors::InternalError::from(DatabaseError::TransactionBegin { source: e }))?;

        self.incident_store
            .set_status(&txn, incident, new_status.as_str(), &actor.id)
            .await?;
        self.write_system_note(&txn, incident_id, &note_text).await?;

        txn.commit()
            .await
            .map_err(|e| crate::errors::InternalError::from(DatabaseError::TransactionCommit { source: e }))?;

        self.audit_logger
            .record(
                incident_id,
                Some(&actor.id),
                AuditAction::StatusChanged,
                &note_text,
                before,
                after,
                meta,
            )
            .await;

        Ok(())
    }

    /// Replace the external folder/report links (coordinator-or-admin)
    pub async fn update_external_links(
        &self,
        actor: &Actor,
        incident_id: &str,
        folder_url: Option<String>,
        report_url: Option<String>,
        meta: &ClientMeta,
    ) -> Result<(), SafetyError> {
        let incident = self.load_for_coordination(actor, incident_id).await?;

        let folder_url = folder_url.filter(|u| !u.trim().is_empty());
        let report_url = report_url.filter(|u| !u.trim().is_empty());

        let before = AuditLogger::snapshot(&serde_json::json!({
            "folder_url": incident.external_folder_url,
            "report_url": incident.external_report_url,
        }));
        let after = AuditLogger::snapshot(&serde_json::json!({
            "folder_url": folder_url,
            "report_url": report_url,
        }));

        let note_text = format!("External links updated by {}", actor.label());

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| crate::errors::InternalError::from(DatabaseError::TransactionBegin { source: e }))?;

        self.incident_store
            .set_external_links(&txn, incident, folder_url, report_url, &actor.id)
            .await?;
        self.write_system_note(&txn, incident_id, &note_text).await?;

        txn.commit()
            .await
            .map_err(|e| crate::errors::InternalError::from(DatabaseError::TransactionCommit { source: e }))?;

        self.audit_logger
            .record(
                incident_id,
                Some(&actor.id),
                AuditAction::ExternalLinksUpdated,
                &note_text,
                before,
                after,
                meta,
            )
            .await;

        Ok(())
    }

    /// Filtered, sorted, paginated staff listing
    ///
    /// Administrators see everything; any other actor is forced down to the
    /// incidents assigned to them, whatever the query said.
    pub async fn list_incidents(
        &self,
        actor: &Actor,
        query: &ListQuery,
    ) -> Result<IncidentPage, SafetyError> {
        let mut filter = parse_filter(query);

        if !actor.is_admin {
            filter.coordinator_id = Some(actor.id.clone());
            filter.unassigned_only = false;
        }

        let sort = IncidentSort::parse(query.sort.as_deref().unwrap_or(""));
        let order = SortOrder::parse(query.order.as_deref().unwrap_or(""));
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let (models, total) = self
            .incident_store
            .list(&filter, sort, order, page, page_size)
            .await?;

        let mut items = Vec::with_capacity(models.len());
        for model in models {
            items.push(self.summarize(model, LIST_PREVIEW_CHARS).await?);
        }

        Ok(IncidentPage {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Coordinator dashboard numbers
    ///
    /// The recent-incidents list is scoped to the actor's assignments unless
    /// they are an administrator; the unassigned counters are global so any
    /// coordinator can see that triage is falling behind.
    pub async fn dashboard_stats(&self, actor: &Actor) -> Result<DashboardStats, SafetyError> {
        let unassigned_open = self.incident_store.count_unassigned_open().await?;

        let cutoff = (Utc::now() - chrono::Duration::days(STALE_UNASSIGNED_DAYS)).to_rfc3339();
        let has_stale_unassigned = self.incident_store.has_stale_unassigned(&cutoff).await?;

        let scope = if actor.is_admin {
            None
        } else {
            Some(actor.id.as_str())
        };
        let recent = self
            .incident_store
            .recent_open(scope, DASHBOARD_RECENT_LIMIT)
            .await?;

        let mut recent_open = Vec::with_capacity(recent.len());
        for model in recent {
            recent_open.push(self.summarize(model, DASHBOARD_PREVIEW_CHARS).await?);
        }

        Ok(DashboardStats {
            unassigned_open,
            has_stale_unassigned,
            recent_open,
        })
    }

    /// A reporter's own non-anonymous incidents, newest first
    pub async fn my_reports(
        &self,
        actor: &Actor,
        page: Option<u64>,
        page_size: Option<u64>,
    ) -> Result<MyReportPage, SafetyError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let (models, total) = self
            .incident_store
            .list_for_reporter(&actor.id, page, page_size)
            .await?;

        let items = models
            .into_iter()
            .map(|m| MyReportSummary {
                id: m.id,
                title: m.title,
                severity: m.severity,
                incident_type: m.incident_type,
                status: m.status,
                incident_date: m.incident_date,
                reported_at: m.reported_at,
            })
            .collect();

        Ok(MyReportPage {
            items,
            total,
            page,
            page_size,
        })
    }

    /// Reduced detail of one of the reporter's own incidents
    ///
    /// Someone else's incident id returns the same NotFound as a missing one.
    pub async fn my_report_detail(
        &self,
        actor: &Actor,
        incident_id: &str,
    ) -> Result<MyReportDetail, SafetyError> {
        let incident = self
            .incident_store
            .find_by_id(incident_id)
            .await?
            .ok_or_else(SafetyError::not_found)?;

        if incident.is_anonymous || incident.reporter_id.as_deref() != Some(actor.id.as_str()) {
            return Err(SafetyError::not_found());
        }

        Ok(MyReportDetail {
            description: self
                .encryption
                .decrypt_or_placeholder(&incident.encrypted_description),
            id: incident.id,
            title: incident.title,
            severity: incident.severity,
            incident_type: incident.incident_type,
            location: incident.location,
            incident_date: incident.incident_date,
            status: incident.status,
            reported_at: incident.reported_at,
            request_follow_up: incident.request_follow_up,
        })
    }

    /// Load an incident the actor may coordinate (admin or its coordinator)
    async fn load_for_coordination(
        &self,
        actor: &Actor,
        incident_id: &str,
    ) -> Result<incident::Model, SafetyError> {
        let incident = self
            .incident_store
            .find_by_id(incident_id)
            .await?
            .ok_or_else(SafetyError::not_found)?;

        let facts = AccessFacts::from(&incident);
        if !policy::can_view_private_notes(actor, &facts) {
            return Err(SafetyError::access_denied());
        }

        Ok(incident)
    }

    /// Write an authorless, public, immutable system note on `conn`
    async fn write_system_note<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        incident_id: &str,
        content: &str,
    ) -> Result<(), SafetyError> {
        let encrypted = self
            .encryption
            .encrypt(content)
            .map_err(crate::errors::InternalError::from)?;

        self.note_store
            .insert(
                conn,
                NewNote {
                    incident_id: incident_id.to_string(),
                    encrypted_content: encrypted,
                    kind: NoteKind::System,
                    is_private: false,
                    author_id: None,
                    tags: None,
                },
            )
            .await?;

        Ok(())
    }

    async fn summarize(
        &self,
        model: incident::Model,
        preview_chars: usize,
    ) -> Result<IncidentSummary, SafetyError> {
        let note_count = self.note_store.count_for_incident(&model.id).await?;

        Ok(IncidentSummary {
            description_preview: self
                .encryption
                .decrypt_preview(&model.encrypted_description, preview_chars),
            id: model.id,
            reference_number: model.reference_number,
            title: model.title,
            severity: model.severity,
            incident_type: model.incident_type,
            status: model.status,
            location: model.location,
            incident_date: model.incident_date,
            reported_at: model.reported_at,
            coordinator_id: model.coordinator_id,
            is_anonymous: model.is_anonymous,
            note_count,
        })
    }
}

/// Parse raw query input into a filter, dropping what does not parse
fn parse_filter(query: &ListQuery) -> IncidentFilter {
    let statuses = query
        .statuses
        .as_deref()
        .map(|csv| {
            csv.split(',')
                .filter_map(IncidentStatus::parse)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let types = query
        .types
        .as_deref()
        .map(|csv| {
            csv.split(',')
                .filter_map(IncidentType::parse)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    IncidentFilter {
        search: query.search.clone().filter(|s| !s.trim().is_empty()),
        statuses,
        types,
        start_date: normalize_filter_date(query.start_date.as_deref(), false),
        end_date: normalize_filter_date(query.end_date.as_deref(), true),
        coordinator_id: query.coordinator_id.clone().filter(|c| !c.trim().is_empty()),
        unassigned_only: query.unassigned_only,
    }
}

/// Accept either a full RFC3339 timestamp or a bare `YYYY-MM-DD` date
fn normalize_incident_date(raw: &str) -> Result<DateTime<Utc>, SafetyError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| SafetyError::validation("Invalid incident date"))?;
        return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc));
    }

    Err(SafetyError::validation("Invalid incident date"))
}

/// Filter dates are lenient like the status/type tokens: unparseable input
/// simply drops the bound. End dates cover the whole day.
fn normalize_filter_date(raw: Option<&str>, end_of_day: bool) -> Option<String> {
    let raw = raw?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        return time.map(|t| DateTime::<Utc>::from_naive_utc_and_offset(t, Utc).to_rfc3339());
    }

    None
}

#[cfg(test)]
#[path = "safety_service_tests.rs"]
mod safety_service_tests;
