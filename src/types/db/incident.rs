use sea_orm::entity::prelude::*;

/// SeaORM entity for the incidents table
///
/// Sensitive columns (description, involved parties, witnesses, contact email,
/// contact phone) only ever hold encryption envelopes, never plaintext.
/// Timestamps are stored as RFC3339 strings in UTC.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub reference_number: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub location: String,
    pub incident_date: String,
    pub reported_at: String,
    pub encrypted_description: String,
    pub encrypted_involved_parties: Option<String>,
    pub encrypted_witnesses: Option<String>,
    pub encrypted_contact_email: Option<String>,
    pub encrypted_contact_phone: Option<String>,
    pub is_anonymous: bool,
    pub request_follow_up: bool,
    pub reporter_id: Option<String>,
    pub created_by: Option<String>,
    pub status: String,
    pub coordinator_id: Option<String>,
    pub external_folder_url: Option<String>,
    pub external_report_url: Option<String>,
    pub updated_at: String,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::incident_note::Entity")]
    Notes,
    #[sea_orm(has_many = "super::incident_audit_entry::Entity")]
    AuditEntries,
}

impl Related<super::incident_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl Related<super::incident_audit_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
