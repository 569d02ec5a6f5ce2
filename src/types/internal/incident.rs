use std::fmt;

/// Workflow status of an incident
///
/// `Closed` and `Archived` are terminal: the service layer refuses further
/// status transitions from them, while coordinator reassignment and notes
/// remain possible for record-keeping. All other transitions are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentStatus {
    New,
    InProgress,
    UnderReview,
    OnHold,
    Resolved,
    Closed,
    Archived,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::UnderReview => "under_review",
            Self::OnHold => "on_hold",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }

    /// Lenient parse used for stored values and filter input
    ///
    /// Returns `None` for unknown values; filter parsing silently drops them.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "in_progress" => Some(Self::InProgress),
            "under_review" => Some(Self::UnderReview),
            "on_hold" => Some(Self::OnHold),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Archived)
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity classification, ordered from Low to Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category tag for an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentType {
    SafetyViolation,
    ConsentViolation,
    EquipmentFailure,
    Injury,
    Harassment,
    PolicyViolation,
    Other,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SafetyViolation => "safety_violation",
            Self::ConsentViolation => "consent_violation",
            Self::EquipmentFailure => "equipment_failure",
            Self::Injury => "injury",
            Self::Harassment => "harassment",
            Self::PolicyViolation => "policy_violation",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "safety_violation" => Some(Self::SafetyViolation),
            "consent_violation" => Some(Self::ConsentViolation),
            "equipment_failure" => Some(Self::EquipmentFailure),
            "injury" => Some(Self::Injury),
            "harassment" => Some(Self::Harassment),
            "policy_violation" => Some(Self::PolicyViolation),
            "other" => Some(Self::Other),
        _ => None,
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Distinguishes author-owned manual notes from system-generated ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Manual,
    System,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(Self::Manual),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter criteria for incident listing
///
/// Built from raw query input by the service layer; unparseable status/type
/// values have already been dropped by the time this struct exists.
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub search: Option<String>,
    pub statuses: Vec<IncidentStatus>,
    pub types: Vec<IncidentType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub coordinator_id: Option<String>,
    pub unassigned_only: bool,
}

/// Sortable columns for incident listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentSort {
    ReportedAt,
    Status,
    IncidentType,
    IncidentDate,
    Location,
}

impl IncidentSort {
    /// Unknown sort keys fall back to reported-at, the listing default
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "status" => Self::Status,
            "type" | "incident_type" => Self::IncidentType,
            "incident_date" => Self::IncidentDate,
            "location" => Self::Location,
            _ => Self::ReportedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }
}
