// Database entities - SeaORM models
pub mod incident;
pub mod incident_audit_entry;
pub mod incident_note;
