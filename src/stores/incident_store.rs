use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::incident;
use crate::types::internal::{IncidentFilter, IncidentSort, IncidentStatus, SortOrder};

/// New incident row ready for insertion
///
/// Sensitive fields must already be encryption envelopes; the store never
/// sees plaintext. Anonymity has already been enforced by the service layer.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub reference_number: String,
    pub title: String,
    pub severity: String,
    pub incident_type: String,
    pub location: String,
    pub incident_date: String,
    pub encrypted_description: String,
    pub encrypted_involved_parties: Option<String>,
    pub encrypted_witnesses: Option<String>,
    pub encrypted_contact_email: Option<String>,
    pub encrypted_contact_phone: Option<String>,
    pub is_anonymous: bool,
    pub request_follow_up: bool,
    pub reporter_id: Option<String>,
    pub status: String,
}

/// Repository for incident storage operations
pub struct IncidentStore {
    db: DatabaseConnection,
}

impl IncidentStore {
    /// Create a new IncidentStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new incident and return the stored row
    pub async fn insert(&self, new: NewIncident) -> Result<incident::Model, InternalError> {
        let now = Utc::now().to_rfc3339();

        let model = incident::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            reference_number: Set(new.reference_number),
            title: Set(new.title),
            severity: Set(new.severity),
            incident_type: Set(new.incident_type),
            location: Set(new.location),
            incident_date: Set(new.incident_date),
            reported_at: Set(now.clone()),
            encrypted_description: Set(new.encrypted_description),
            encrypted_involved_parties: Set(new.encrypted_involved_parties),
            encrypted_witnesses: Set(new.encrypted_witnesses),
            encrypted_contact_email: Set(new.encrypted_contact_email),
            encrypted_contact_phone: Set(new.encrypted_contact_phone),
            is_anonymous: Set(new.is_anonymous),
            request_follow_up: Set(new.request_follow_up),
            reporter_id: Set(new.reporter_id.clone()),
            created_by: Set(new.reporter_id),
            status: Set(new.status),
            coordinator_id: Set(None),
            external_folder_url: Set(None),
            external_report_url: Set(None),
            updated_at: Set(now),
            updated_by: Set(None),
        };

        model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("insert_incident", e))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<incident::Model>, InternalError> {
        incident::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_incident_by_id", e))
    }

    pub async fn find_by_reference(
        &self,
        reference_number: &str,
    ) -> Result<Option<incident::Model>, InternalError> {
        incident::Entity::find()
            .filter(incident::Column::ReferenceNumber.eq(reference_number))
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_incident_by_reference", e))
    }

    pub async fn reference_exists(&self, reference_number: &str) -> Result<bool, InternalError> {
        let count = incident::Entity::find()
            .filter(incident::Column::ReferenceNumber.eq(reference_number))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("reference_exists", e))?;

        Ok(count > 0)
    }

    /// Look up only the anonymity flag of an incident
    ///
    /// Used by the audit logger, which must re-check the flag on every write.
    pub async fn is_anonymous(&self, id: &str) -> Result<Option<bool>, InternalError> {
        let flag: Option<bool> = incident::Entity::find_by_id(id)
            .select_only()
            .column(incident::Column::IsAnonymous)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("incident_is_anonymous", e))?;

        Ok(flag)
    }

    /// Update the assigned coordinator
    ///
    /// Takes a caller-owned connection so assignment and the accompanying
    /// system note can share one transaction.
    pub async fn set_coordinator<C: ConnectionTrait>(
        &self,
        conn: &C,
        incident: incident::Model,
        coordinator_id: Option<String>,
        updated_by: &str,
    ) -> Result<incident::Model, InternalError> {
        let mut model = incident.into_active_model();
        model.coordinator_id = Set(coordinator_id);
        model.updated_at = Set(Utc::now().to_rfc3339());
        model.updated_by = Set(Some(updated_by.to_string()));

        model
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_coordinator", e))
    }

    /// Update the workflow status (last write wins on concurrent updates)
    pub async fn set_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        incident: incident::Model,
        status: &str,
        updated_by: &str,
    ) -> Result<incident::Model, InternalError> {
        let mut model = incident.into_active_model();
        model.status = Set(status.to_string());
        model.updated_at = Set(Utc::now().to_rfc3339());
        model.updated_by = Set(Some(updated_by.to_string()));

        model
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_status", e))
    }

    /// Replace the external document links
    pub async fn set_external_links<C: ConnectionTrait>(
        &self,
        conn: &C,
        incident: incident::Model,
        folder_url: Option<String>,
        report_url: Option<String>,
        updated_by: &str,
    ) -> Result<incident::Model, InternalError> {
        let mut model = incident.into_active_model();
        model.external_folder_url = Set(folder_url);
        model.external_report_url = Set(report_url);
        model.updated_at = Set(Utc::now().to_rfc3339());
        model.updated_by = Set(Some(updated_by.to_string()));

        model
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_external_links", e))
    }

    /// Filtered, sorted, paginated incident listing
    ///
    /// Returns the requested page plus the total row count before pagination.
    /// `page` is 1-based.
    pub async fn list(
        &self,
        filter: &IncidentFilter,
        sort: IncidentSort,
        order: SortOrder,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<incident::Model>, u64), InternalError> {
        let mut condition = Condition::all();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(incident::Column::ReferenceNumber.contains(search))
                    .add(incident::Column::Title.contains(search))
                    .add(incident::Column::Location.contains(search)),
            );
        }

        if !filter.statuses.is_empty() {
            condition = condition.add(
                incident::Column::Status
                    .is_in(filter.statuses.iter().map(|s| s.as_str()).collect::<Vec<_>>()),
            );
        }

        if !filter.types.is_empty() {
            condition = condition.add(
                incident::Column::IncidentType
                    .is_in(filter.types.iter().map(|t| t.as_str()).collect::<Vec<_>>()),
            );
        }

        if let Some(start) = &filter.start_date {
            condition = condition.add(incident::Column::IncidentDate.gte(start.clone()));
        }

        if let Some(end) = &filter.end_date {
            condition = condition.add(incident::Column::IncidentDate.lte(end.clone()));
        }

        if let Some(coordinator_id) = &filter.coordinator_id {
            condition = condition.add(incident::Column::CoordinatorId.eq(coordinator_id.clone()));
        }

        if filter.unassigned_only {
            condition = condition
                .add(incident::Column::CoordinatorId.is_null())
                .add(incident::Column::Status.is_not_in(Self::terminal_statuses()));
        }

        let sort_column = match sort {
            IncidentSort::ReportedAt => incident::Column::ReportedAt,
            IncidentSort::Status => incident::Column::Status,
            IncidentSort::IncidentType => incident::Column::IncidentType,
            IncidentSort::IncidentDate => incident::Column::IncidentDate,
            IncidentSort::Location => incident::Column::Location,
        };

        let sort_order = match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };

        let paginator = incident::Entity::find()
            .filter(condition)
            .order_by(sort_column, sort_order)
            .paginate(&self.db, page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_incidents", e))?;

        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| InternalError::database("list_incidents", e))?;

        Ok((models, total))
    }

    /// Page through a reporter's own incidents, newest first
    pub async fn list_for_reporter(
        &self,
        reporter_id: &str,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<incident::Model>, u64), InternalError> {
        let paginator = incident::Entity::find()
            .filter(incident::Column::ReporterId.eq(reporter_id))
            .order_by_desc(incident::Column::ReportedAt)
            .paginate(&self.db, page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_reporter_incidents", e))?;

        let models = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| InternalError::database("list_reporter_incidents", e))?;

        Ok((models, total))
    }

    /// Count open incidents with no assigned coordinator
    pub async fn count_unassigned_open(&self) -> Result<u64, InternalError> {
        incident::Entity::find()
            .filter(incident::Column::CoordinatorId.is_null())
            .filter(incident::Column::Status.is_not_in(Self::terminal_statuses()))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("count_unassigned_open", e))
    }

    /// Whether any unassigned open incident was reported before the cutoff
    pub async fn has_stale_unassigned(&self, cutoff: &str) -> Result<bool, InternalError> {
        let count = incident::Entity::find()
            .filter(incident::Column::CoordinatorId.is_null())
            .filter(incident::Column::Status.is_not_in(Self::terminal_statuses()))
            .filter(incident::Column::ReportedAt.lt(cutoff))
            .count(&self.db)
            .await
            .map_err(|e| InternalError::database("has_stale_unassigned", e))?;

        Ok(count > 0)
    }

    /// Most recently reported open incidents, optionally coordinator-scoped
    pub async fn recent_open(
        &self,
        coordinator_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<incident::Model>, InternalError> {
        let mut query = incident::Entity::find()
            .filter(incident::Column::Status.is_not_in(Self::terminal_statuses()));

        if let Some(coordinator_id) = coordinator_id {
            query = query.filter(incident::Column::CoordinatorId.eq(coordinator_id));
        }

        query
            .order_by_desc(incident::Column::ReportedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("recent_open_incidents", e))
    }

    fn terminal_statuses() -> Vec<&'static str> {
        vec![
            IncidentStatus::Closed.as_str(),
            IncidentStatus::Archived.as_str(),
        ]
    }
}
