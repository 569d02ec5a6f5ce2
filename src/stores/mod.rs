// Stores layer - Data access and repository pattern
pub mod audit_store;
pub mod incident_store;
pub mod note_store;

pub use audit_store::AuditStore;
pub use incident_store::IncidentStore;
pub use note_store::NoteStore;
