use sea_orm::entity::prelude::*;

/// SeaORM entity for the incident_audit_log table
///
/// Rows are written once by the audit logger and never updated or deleted;
/// this entity deliberately exposes no update path through the store layer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incident_audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub incident_id: String,
    pub actor_id: Option<String>,
    pub action_type: String,
    pub description: String,
    pub before_state: Option<String>,
    pub after_state: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::incident::Entity",
        from = "Column::IncidentId",
        to = "super::incident::Column::Id"
    )]
    Incident,
}

impl Related<super::incident::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incident.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
