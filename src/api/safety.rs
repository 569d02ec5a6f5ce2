use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};

use crate::api::{actor_from_request, client_meta, require_actor};
use crate::errors::api::SafetyError;
use crate::services::safety_service::{ListQuery, SubmitIncident};
use crate::services::{NotesService, SafetyService};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::safety::{
    AddNoteRequest, AssignCoordinatorRequest, CreateIncidentRequest, DashboardStatsResponse,
    ExternalLinksRequest, IncidentDetailResponse, IncidentStatusResponse, MyReportDetailDto,
    MyReportsResponse, NoteDto, NotesResponse, PaginatedIncidentsResponse, StatusUpdateRequest,
    SubmissionResponse, UpdateNoteRequest,
};

/// Safety incident API endpoints
pub struct SafetyApi {
    safety_service: Arc<SafetyService>,
    notes_service: Arc<NotesService>,
}

impl SafetyApi {
    /// Create a new SafetyApi over the shared services
    pub fn new(safety_service: Arc<SafetyService>, notes_service: Arc<NotesService>) -> Self {
        Self {
            safety_service,
            notes_service,
        }
    }
}

/// API tags for safety endpoints
#[derive(Tags)]
enum ApiTags {
    /// Incident reporting and public status lookup
    Reporting,
    /// Incident coordination for staff
    Incidents,
    /// Notes on incidents
    Notes,
}

#[OpenApi(prefix_path = "/safety")]
impl SafetyApi {
    /// Submit a new incident report
    ///
    /// Open to unauthenticated callers so anonymous reporting works; a
    /// signed-in reporter is linked through the identity headers unless the
    /// submission is anonymous.
    #[oai(path = "/incidents", method = "post", tag = "ApiTags::Reporting")]
    async fn submit_incident(
        &self,
        req: &Request,
        body: Json<CreateIncidentRequest>,
    ) -> Result<Json<SubmissionResponse>, SafetyError> {
        let body = body.0;
        let reporter_id = actor_from_request(req).map(|a| a.id);

        let submission = SubmitIncident {
            title: body.title,
            severity: body.severity,
            incident_type: body.incident_type,
            location: body.location,
            incident_date: body.incident_date,
            description: body.description,
            involved_parties: body.involved_parties,
            witnesses: body.witnesses,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
            is_anonymous: body.is_anonymous,
            request_follow_up: body.request_follow_up,
            reporter_id,
        };

        let receipt = self
            .safety_service
            .submit(submission, &client_meta(req))
            .await?;

        Ok(Json(receipt.into()))
    }

    /// Public status lookup by reference number
    #[oai(path = "/status/:reference", method = "get", tag = "ApiTags::Reporting")]
    async fn status_by_reference(
        &self,
        reference: Path<String>,
    ) -> Result<Json<IncidentStatusResponse>, SafetyError> {
        let view = self.safety_service.status_by_reference(&reference.0).await?;
        Ok(Json(view.into()))
    }

    /// List incidents for staff
    ///
    /// Administrators see everything; coordinators see their assignments.
    #[oai(path = "/incidents", method = "get", tag = "ApiTags::Incidents")]
    #[allow(clippy::too_many_arguments)]
    async fn list_incidents(
        &self,
        req: &Request,
        search: Query<Option<String>>,
        statuses: Query<Option<String>>,
        types: Query<Option<String>>,
        start_date: Query<Option<String>>,
        end_date: Query<Option<String>>,
        coordinator_id: Query<Option<String>>,
        unassigned: Query<Option<bool>>,
        sort: Query<Option<String>>,
        order: Query<Option<String>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<PaginatedIncidentsResponse>, SafetyError> {
        let actor = require_actor(req)?;

        let query = ListQuery {
            search: search.0,
            statuses: statuses.0,
            types: types.0,
            start_date: start_date.0,
            end_date: end_date.0,
            coordinator_id: coordinator_id.0,
            unassigned_only: unassigned.0.unwrap_or(false),
            sort: sort.0,
            order: order.0,
            page: page.0,
            page_size: page_size.0,
        };

        let page = self.safety_service.list_incidents(&actor, &query).await?;
        Ok(Json(page.into()))
    }

    /// Full incident detail with decrypted fields and audit trail
    ///
    /// Admin or assigned coordinator only; reporters track their own
    /// submissions through the my-reports endpoints.
    #[oai(path = "/incidents/:id", method = "get", tag = "ApiTags::Incidents")]
    async fn incident_detail(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<Json<IncidentDetailResponse>, SafetyError> {
        let actor = require_actor(req)?;
        let detail = self
            .safety_service
            .incident_detail(&actor, &id.0, &client_meta(req))
            .await?;
        Ok(Json(detail.into()))
    }

    /// Assign, reassign, or unassign the coordinator (admin only)
    #[oai(
        path = "/incidents/:id/coordinator",
        method = "put",
        tag = "ApiTags::Incidents"
    )]
    async fn assign_coordinator(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<AssignCoordinatorRequest>,
    ) -> Result<Json<MessageResponse>, SafetyError> {
        let actor = require_actor(req)?;
        self.safety_service
            .assign_coordinator(
                &actor,
                &id.0,
                body.0.coordinator_id,
                body.0.coordinator_name,
                &client_meta(req),
            )
            .await?;
        Ok(Json(MessageResponse::ok()))
    }

    /// Change the workflow status
    #[oai(
        path = "/incidents/:id/status",
        method = "put",
        tag = "ApiTags::Incidents"
    )]
    async fn update_status(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<StatusUpdateRequest>,
    ) -> Result<Json<MessageResponse>, SafetyError> {
        let actor = require_actor(req)?;
        self.safety_service
            .update_status(
                &actor,
                &id.0,
                &body.0.status,
                body.0.reason.as_deref(),
                &client_meta(req),
            )
            .await?;
        Ok(Json(MessageResponse::ok()))
    }

    /// Replace the external folder/report links
    #[oai(
        path = "/incidents/:id/links",
        method = "put",
        tag = "ApiTags::Incidents"
    )]
    async fn update_external_links(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<ExternalLinksRequest>,
    ) -> Result<Json<MessageResponse>, SafetyError> {
        let actor = require_actor(req)?;
        self.safety_service
            .update_external_links(
                &actor,
                &id.0,
                body.0.folder_url,
                body.0.report_url,
                &client_meta(req),
            )
            .await?;
        Ok(Json(MessageResponse::ok()))
    }

    /// Coordinator dashboard numbers
    #[oai(path = "/dashboard", method = "get", tag = "ApiTags::Incidents")]
    async fn dashboard(&self, req: &Request) -> Result<Json<DashboardStatsResponse>, SafetyError> {
        let actor = require_actor(req)?;
        let stats = self.safety_service.dashboard_stats(&actor).await?;
        Ok(Json(stats.into()))
    }

    /// The reporter's own incidents
    #[oai(path = "/my-reports", method = "get", tag = "ApiTags::Reporting")]
    async fn my_reports(
        &self,
        req: &Request,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<MyReportsResponse>, SafetyError> {
        let actor = require_actor(req)?;
        let reports = self
            .safety_service
            .my_reports(&actor, page.0, page_size.0)
            .await?;
        Ok(Json(reports.into()))
    }

    /// Reduced detail of one of the reporter's own incidents
    #[oai(path = "/my-reports/:id", method = "get", tag = "ApiTags::Reporting")]
    async fn my_report_detail(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<Json<MyReportDetailDto>, SafetyError> {
        let actor = require_actor(req)?;
        let detail = self.safety_service.my_report_detail(&actor, &id.0).await?;
        Ok(Json(detail.into()))
    }

    /// Notes visible to the requesting actor, newest first
    #[oai(path = "/incidents/:id/notes", method = "get", tag = "ApiTags::Notes")]
    async fn list_notes(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<Json<NotesResponse>, SafetyError> {
        let actor = require_actor(req)?;
        let notes = self.notes_service.list_notes(&actor, &id.0).await?;
        Ok(Json(NotesResponse {
            notes: notes.into_iter().map(Into::into).collect(),
        }))
    }

    /// Add a manual note
    #[oai(path = "/incidents/:id/notes", method = "post", tag = "ApiTags::Notes")]
    async fn add_note(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<AddNoteRequest>,
    ) -> Result<Json<NoteDto>, SafetyError> {
        let actor = require_actor(req)?;
        let note = self
            .notes_service
            .add_note(
                &actor,
                &id.0,
                &body.0.content,
                body.0.is_private,
                body.0.tags,
                &client_meta(req),
            )
            .await?;
        Ok(Json(note.into()))
    }

    /// Edit a manual note (author or admin)
    #[oai(path = "/notes/:note_id", method = "put", tag = "ApiTags::Notes")]
    async fn update_note(
        &self,
        req: &Request,
        note_id: Path<String>,
        body: Json<UpdateNoteRequest>,
    ) -> Result<Json<NoteDto>, SafetyError> {
        let actor = require_actor(req)?;
        let note = self
            .notes_service
            .update_note(
                &actor,
                &note_id.0,
                &body.0.content,
                body.0.is_private,
                body.0.tags,
                &client_meta(req),
            )
            .await?;
        Ok(Json(note.into()))
    }

    /// Delete a manual note (author or admin)
    #[oai(path = "/notes/:note_id", method = "delete", tag = "ApiTags::Notes")]
    async fn delete_note(
        &self,
        req: &Request,
        note_id: Path<String>,
    ) -> Result<Json<MessageResponse>, SafetyError> {
        let actor = require_actor(req)?;
        self.notes_service
            .delete_note(&actor, &note_id.0, &client_meta(req))
            .await?;
        Ok(Json(MessageResponse::ok()))
    }
}
