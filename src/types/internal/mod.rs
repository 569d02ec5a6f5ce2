pub mod actor;
pub mod audit;
pub mod incident;

pub use actor::{Actor, ClientMeta};
pub use audit::{AuditAction, AuditRecord};
pub use incident::{
    IncidentFilter, IncidentSeverity, IncidentSort, IncidentStatus, IncidentType, NoteKind,
    SortOrder,
};
