use poem_openapi::Object;

use crate::services::notes_service::NoteView;
use crate::services::safety_service::{
    DashboardStats, IncidentDetail, IncidentPage, IncidentSummary, MyReportDetail, MyReportPage,
    MyReportSummary, StatusView, SubmissionReceipt,
};
use crate::types::internal::AuditRecord;

/// Request model for submitting a new incident report
#[derive(Object, Debug)]
pub struct CreateIncidentRequest {
    /// Optional title; generated from type and date when omitted
    #[oai(validator(max_length = 200))]
    pub title: Option<String>,

    /// Severity: low, medium, high, or critical
    pub severity: String,

    /// Incident category, e.g. equipment_failure or harassment
    pub incident_type: String,

    /// Where the incident happened
    #[oai(validator(min_length = 1, max_length = 300))]
    pub location: String,

    /// When the incident happened (RFC 3339 or YYYY-MM-DD, not in the future)
    pub incident_date: String,

    /// What happened; stored encrypted
    #[oai(validator(min_length = 1))]
    pub description: String,

    /// Who was involved; stored encrypted
    pub involved_parties: Option<String>,

    /// Who saw it; stored encrypted
    pub witnesses: Option<String>,

    /// Contact email for follow-up; stored encrypted
    pub contact_email: Option<String>,

    /// Contact phone for follow-up; stored encrypted
    pub contact_phone: Option<String>,

    /// Submit without any linked identity
    #[oai(default)]
    pub is_anonymous: bool,

    /// Whether the reporter wants to be contacted
    #[oai(default)]
    pub request_follow_up: bool,
}

/// What the reporter receives after submitting
#[derive(Object, Debug)]
pub struct SubmissionResponse {
    /// Internal incident identifier
    pub incident_id: String,

    /// Human-readable reference for the public status lookup
    pub reference_number: String,

    /// Relative URL of the status lookup for this reference
    pub tracking_url: String,
}

impl From<SubmissionReceipt> for SubmissionResponse {
    fn from(r: SubmissionReceipt) -> Self {
        Self {
            incident_id: r.incident_id,
            reference_number: r.reference_number,
            tracking_url: r.tracking_url,
        }
    }
}

/// Public status of an incident, looked up by reference number
#[derive(Object, Debug)]
pub struct IncidentStatusResponse {
    pub reference_number: String,
    pub status: String,
    pub reported_at: String,
    pub last_updated: String,
    /// Whether follow-up contact is possible for this report
    pub can_follow_up: bool,
}

impl From<StatusView> for IncidentStatusResponse {
    fn from(v: StatusView) -> Self {
        Self {
            reference_number: v.reference_number,
            status: v.status,
            reported_at: v.reported_at,
            last_updated: v.last_updated,
            can_follow_up: v.can_follow_up,
        }
    }
}

/// One entry of an incident's audit trail
///
/// The stored entry also carries the client IP and user agent for
/// compliance review; those never leave the server, so the wire model is
/// limited to the action, its description, the actor, and the state diff.
#[derive(Object, Debug)]
pub struct AuditEntryDto {
    pub id: i64,
    pub actor_id: Option<String>,
    pub action: String,
    pub description: String,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
    pub created_at: String,
}

impl From<AuditRecord> for AuditEntryDto {
    fn from(r: AuditRecord) -> Self {
        Self {
            id: r.id,
            actor_id: r.actor_id,
            action: r.action,
            description: r.description,
            before_state: r.before_state,
            after_state: r.after_state,
            created_at: r.created_at,
        }
    }
}

/// Full decrypted incident detail for authorized staff
#[derive(Object, Debug)]
pub struct IncidentDetailResponse {
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
    /// Audit trail, newest first
    pub audit_trail: Vec<AuditEntryDto>,
}

impl From<IncidentDetail> for IncidentDetailResponse {
    fn from(d: IncidentDetail) -> Self {
        Self {
            id: d.id,
            reference_number: d.reference_number,
            title: d.title,
            severity: d.severity,
            incident_type: d.incident_type,
            location: d.location,
            incident_date: d.incident_date,
            reported_at: d.reported_at,
            status: d.status,
            description: d.description,
            involved_parties: d.involved_parties,
            witnesses: d.witnesses,
            contact_email: d.contact_email,
            contact_phone: d.contact_phone,
            is_anonymous: d.is_anonymous,
            request_follow_up: d.request_follow_up,
            coordinator_id: d.coordinator_id,
            external_folder_url: d.external_folder_url,
            external_report_url: d.external_report_url,
            updated_at: d.updated_at,
            audit_trail: d.audit_trail.into_iter().map(Into::into).collect(),
        }
    }
}

/// One row of the staff incident list
#[derive(Object, Debug)]
pub struct IncidentSummaryDto {
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
    /// Bounded decrypted preview of the description
    pub description_preview: String,
    pub note_count: u64,
}

impl From<IncidentSummary> for IncidentSummaryDto {
    fn from(s: IncidentSummary) -> Self {
        Self {
            id: s.id,
            reference_number: s.reference_number,
            title: s.title,
            severity: s.severity,
            incident_type: s.incident_type,
            status: s.status,
            location: s.location,
            incident_date: s.incident_date,
            reported_at: s.reported_at,
            coordinator_id: s.coordinator_id,
            is_anonymous: s.is_anonymous,
            description_preview: s.description_preview,
            note_count: s.note_count,
        }
    }
}

/// A page of incident summaries
#[derive(Object, Debug)]
pub struct PaginatedIncidentsResponse {
    pub items: Vec<IncidentSummaryDto>,
    /// Total matching rows before pagination
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl From<IncidentPage> for PaginatedIncidentsResponse {
    fn from(p: IncidentPage) -> Self {
        Self {
            items: p.items.into_iter().map(Into::into).collect(),
            total: p.total,
            page: p.page,
            page_size: p.page_size,
        }
    }
}

/// Coordinator dashboard numbers
#[derive(Object, Debug)]
pub struct DashboardStatsResponse {
    /// Open incidents with no coordinator
    pub unassigned_open: u64,

    /// Whether any unassigned incident has been waiting over a week
    pub has_stale_unassigned: bool,

    /// Most recent open incidents, coordinator-scoped for non-admins
    pub recent_open: Vec<IncidentSummaryDto>,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            unassigned_open: s.unassigned_open,
            has_stale_unassigned: s.has_stale_unassigned,
            recent_open: s.recent_open.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request model for coordinator assignment (admin only)
#[derive(Object, Debug)]
pub struct AssignCoordinatorRequest {
    /// New coordinator's user id; omit or empty to unassign
    pub coordinator_id: Option<String>,

    /// Display name used in the system note
    pub coordinator_name: Option<String>,
}

/// Request model for a workflow status change
#[derive(Object, Debug)]
pub struct StatusUpdateRequest {
    /// Target status, e.g. in_progress or resolved
    pub status: String,

    /// Optional reason recorded in the system note
    pub reason: Option<String>,
}

/// Request model for replacing the external document links
#[derive(Object, Debug)]
pub struct ExternalLinksRequest {
    pub folder_url: Option<String>,
    pub report_url: Option<String>,
}

/// Request model for adding a manual note
#[derive(Object, Debug)]
pub struct AddNoteRequest {
    #[oai(validator(min_length = 1))]
    pub content: String,

    /// Visible to admins and the coordinator only
    #[oai(default)]
    pub is_private: bool,

    /// Free-form tags
    pub tags: Option<String>,
}

/// Request model for editing a manual note
#[derive(Object, Debug)]
pub struct UpdateNoteRequest {
    #[oai(validator(min_length = 1))]
    pub content: String,

    #[oai(default)]
    pub is_private: bool,

    pub tags: Option<String>,
}

/// Decrypted note as visible to the requesting actor
#[derive(Object, Debug)]
pub struct NoteDto {
    pub id: String,
    pub incident_id: String,
    pub content: String,
    /// manual or system
    pub kind: String,
    pub is_private: bool,
    pub author_id: Option<String>,
    pub tags: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<NoteView> for NoteDto {
    fn from(n: NoteView) -> Self {
        Self {
            id: n.id,
            incident_id: n.incident_id,
            content: n.content,
            kind: n.kind,
            is_private: n.is_private,
            author_id: n.author_id,
            tags: n.tags,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

/// Notes visible to the requesting actor, newest first
#[derive(Object, Debug)]
pub struct NotesResponse {
    pub notes: Vec<NoteDto>,
}

/// Reduced projection of a reporter's own incident
#[derive(Object, Debug)]
pub struct MyReportSummaryDto {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub status: String,
    pub incident_date: String,
    pub reported_at: String,
}

impl From<MyReportSummary> for MyReportSummaryDto {
    fn from(s: MyReportSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            severity: s.severity,
            incident_type: s.incident_type,
            status: s.status,
            incident_date: s.incident_date,
            reported_at: s.reported_at,
        }
    }
}

/// A page of the reporter's own incidents
#[derive(Object, Debug)]
pub struct MyReportsResponse {
    pub items: Vec<MyReportSummaryDto>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl From<MyReportPage> for MyReportsResponse {
    fn from(p: MyReportPage) -> Self {
        Self {
            items: p.items.into_iter().map(Into::into).collect(),
            total: p.total,
            page: p.page,
            page_size: p.page_size,
        }
    }
}

/// Reduced detail of one of the reporter's own incidents
#[derive(Object, Debug)]
pub struct MyReportDetailDto {
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

impl From<MyReportDetail> for MyReportDetailDto {
    fn from(d: MyReportDetail) -> Self {
        Self {
            id: d.id,
            title: d.title,
            severity: d.severity,
            incident_type: d.incident_type,
            location: d.location,
            incident_date: d.incident_date,
            status: d.status,
            reported_at: d.reported_at,
            description: d.description,
            request_follow_up: d.request_follow_up,
        }
    }
}

#[cfg(test)]
mod tests {
    use poem_openapi::types::ToJSON;

    use super::AuditEntryDto;
    use crate::types::internal::AuditRecord;

    #[test]
    fn audit_entries_serialize_without_client_metadata() {
        let record = AuditRecord {
            id: 1,
            incident_id: "incident-1".to_string(),
            actor_id: Some("coord-1".to_string()),
            action: "Viewed".to_string(),
            description: "Incident viewed by Casey Coordinator".to_string(),
            before_state: None,
            after_state: None,
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("test-agent/1.0".to_string()),
            created_at: "2024-06-01T10:00:00+00:00".to_string(),
        };

        let json = AuditEntryDto::from(record).to_json().unwrap();
        let entry = json.as_object().unwrap();

        assert_eq!(entry["action"], "Viewed");
        assert_eq!(entry["actor_id"], "coord-1");
        assert!(!entry.contains_key("ip_address"));
        assert!(!entry.contains_key("user_agent"));
    }
}
