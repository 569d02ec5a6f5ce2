use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create incidents table
        manager
            .create_table(
                Table::create()
                    .table(Incidents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Incidents::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Incidents::ReferenceNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Incidents::Title).string().not_null())
                    .col(ColumnDef::new(Incidents::Severity).string().not_null())
                    .col(ColumnDef::new(Incidents::IncidentType).string().not_null())
                    .col(ColumnDef::new(Incidents::Location).string().not_null())
                    .col(ColumnDef::new(Incidents::IncidentDate).string().not_null())
                    .col(ColumnDef::new(Incidents::ReportedAt).string().not_null())
                    .col(ColumnDef::new(Incidents::EncryptedDescription).text().not_null())
                    .col(ColumnDef::new(Incidents::EncryptedInvolvedParties).text())
                    .col(ColumnDef::new(Incidents::EncryptedWitnesses).text())
                    .col(ColumnDef::new(Incidents::EncryptedContactEmail).text())
                    .col(ColumnDef::new(Incidents::EncryptedContactPhone).text())
                    .col(ColumnDef::new(Incidents::IsAnonymous).boolean().not_null())
                    .col(ColumnDef::new(Incidents::RequestFollowUp).boolean().not_null())
                    .col(ColumnDef::new(Incidents::ReporterId).string())
                    .col(ColumnDef::new(Incidents::CreatedBy).string())
                    .col(ColumnDef::new(Incidents::Status).string().not_null())
                    .col(ColumnDef::new(Incidents::CoordinatorId).string())
                    .col(ColumnDef::new(Incidents::ExternalFolderUrl).string())
                    .col(ColumnDef::new(Incidents::ExternalReportUrl).string())
                    .col(ColumnDef::new(Incidents::UpdatedAt).string().not_null())
                    .col(ColumnDef::new(Incidents::UpdatedBy).string())
                    .to_owned(),
            )
            .await?;

        // Create incident_notes table
        manager
            .create_table(
                Table::create()
                    .table(IncidentNotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IncidentNotes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(IncidentNotes::IncidentId).string().not_null())
                    .col(ColumnDef::new(IncidentNotes::EncryptedContent).text().not_null())
                    .col(ColumnDef::new(IncidentNotes::Kind).string().not_null())
                    .col(ColumnDef::new(IncidentNotes::IsPrivate).boolean().not_null())
                    .col(ColumnDef::new(IncidentNotes::AuthorId).string())
                    .col(ColumnDef::new(IncidentNotes::Tags).text())
                    .col(ColumnDef::new(IncidentNotes::CreatedAt).string().not_null())
                    .col(ColumnDef::new(IncidentNotes::UpdatedAt).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_notes_incident_id")
                            .from(IncidentNotes::Table, IncidentNotes::IncidentId)
                            .to(Incidents::Table, Incidents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create incident_audit_log table
        // No update/delete path exists for this table in application code
        manager
            .create_table(
                Table::create()
                    .table(IncidentAuditLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IncidentAuditLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IncidentAuditLog::IncidentId).string().not_null())
                    .col(ColumnDef::new(IncidentAuditLog::ActorId).string())
                    .col(ColumnDef::new(IncidentAuditLog::ActionType).string().not_null())
                    .col(ColumnDef::new(IncidentAuditLog::Description).text().not_null())
                    .col(ColumnDef::new(IncidentAuditLog::BeforeState).text())
                    .col(ColumnDef::new(IncidentAuditLog::AfterState).text())
                    .col(ColumnDef::new(IncidentAuditLog::IpAddress).string())
                    .col(ColumnDef::new(IncidentAuditLog::UserAgent).string())
                    .col(ColumnDef::new(IncidentAuditLog::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incident_audit_log_incident_id")
                            .from(IncidentAuditLog::Table, IncidentAuditLog::IncidentId)
                            .to(Incidents::Table, Incidents::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes separately
        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_status")
                    .table(Incidents::Table)
                    .col(Incidents::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_coordinator_id")
                    .table(Incidents::Table)
                    .col(Incidents::CoordinatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incidents_reporter_id")
                    .table(Incidents::Table)
                    .col(Incidents::ReporterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incident_notes_incident_id")
                    .table(IncidentNotes::Table)
                    .col(IncidentNotes::IncidentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_incident_audit_log_incident_id_created_at")
                    .table(IncidentAuditLog::Table)
                    .col(IncidentAuditLog::IncidentId)
                    .col(IncidentAuditLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IncidentAuditLog::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(IncidentNotes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Incidents::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Incidents {
    Table,
    Id,
    ReferenceNumber,
    Title,
    Severity,
    IncidentType,
    Location,
    IncidentDate,
    ReportedAt,
    EncryptedDescription,
    EncryptedInvolvedParties,
    EncryptedWitnesses,
    EncryptedContactEmail,
    EncryptedContactPhone,
    IsAnonymous,
    RequestFollowUp,
    ReporterId,
    CreatedBy,
    Status,
    CoordinatorId,
    ExternalFolderUrl,
    ExternalReportUrl,
    UpdatedAt,
    UpdatedBy,
}

#[derive(DeriveIden)]
enum IncidentNotes {
    Table,
    Id,
    IncidentId,
    EncryptedContent,
    Kind,
    IsPrivate,
    AuthorId,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IncidentAuditLog {
    Table,
    Id,
    IncidentId,
    ActorId,
    ActionType,
    Description,
    BeforeState,
    AfterState,
    IpAddress,
    UserAgent,
    CreatedAt,
}
