use std::fmt;

/// Action types for the incident audit trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditAction {
    Created,
    Viewed,
    StatusChanged,
    Assigned,
    ExternalLinksUpdated,
    NoteAdded,
    NoteUpdated,
    NoteDeleted,
}

impl AuditAction {
    /// String representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Viewed => "Viewed",
            Self::StatusChanged => "StatusChanged",
            Self::Assigned => "Assigned",
            Self::ExternalLinksUpdated => "ExternalLinksUpdated",
            Self::NoteAdded => "NoteAdded",
            Self::NoteUpdated => "NoteUpdated",
            Self::NoteDeleted => "NoteDeleted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain view of a stored audit entry, returned newest-first by the trail
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: i64,
    pub incident_id: String,
    pub actor_id: Option<String>,
    pub action: String,
    pub description: String,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}
