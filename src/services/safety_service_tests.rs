#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::app_data::AppData;
    use crate::errors::api::safety::SafetyError;
    use crate::services::safety_service::{ListQuery, SubmitIncident};
    use crate::services::SafetyService;
    use crate::test::utils::{
        admin, client_meta, coordinator, reporter, sample_submission, setup_app_data,
        setup_app_data_with_broken_audit,
    };
    use crate::types::internal::NoteKind;

    fn service(app_data: &Arc<AppData>) -> SafetyService {
        SafetyService::new(app_data.clone())
    }

    #[tokio::test]
    async fn submit_stores_ciphertext_not_plaintext() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        let stored = app_data
            .incident_store
            .find_by_id(&receipt.incident_id)
            .await
            .unwrap()
            .unwrap();

        assert_ne!(
            stored.encrypted_description,
            "A ceiling anchor slipped during load testing"
        );
        assert!(!stored
            .encrypted_description
            .contains("ceiling anchor"));

        let decrypted = app_data
            .encryption_service
            .decrypt(&stored.encrypted_description)
            .unwrap();
        assert_eq!(decrypted, "A ceiling anchor slipped during load testing");

        assert!(receipt.reference_number.starts_with("SAF-"));
        assert_eq!(
            receipt.tracking_url,
            format!("/safety/status/{}", receipt.reference_number)
        );
    }

    #[tokio::test]
    async fn submit_writes_created_audit_entry_with_client_meta() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, "Created");
        assert_eq!(trail[0].actor_id.as_deref(), Some("reporter-1"));
        assert_eq!(trail[0].ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(trail[0].user_agent.as_deref(), Some("test-agent/1.0"));
    }

    #[tokio::test]
    async fn anonymous_submission_records_no_identity_or_ip() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let submission = SubmitIncident {
            is_anonymous: true,
            ..sample_submission()
        };
        let receipt = svc.submit(submission, &client_meta()).await.unwrap();

        let stored = app_data
            .incident_store
            .find_by_id(&receipt.incident_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_anonymous);
        // Reporter identity is discarded even though the caller supplied one
        assert_eq!(stored.reporter_id, None);
        assert_eq!(stored.created_by, None);

        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].actor_id, None);
        assert_eq!(trail[0].ip_address, None);
    }

    #[tokio::test]
    async fn anonymous_incident_never_gains_an_ip_in_later_entries() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let submission = SubmitIncident {
            is_anonymous: true,
            ..sample_submission()
        };
        let receipt = svc.submit(submission, &client_meta()).await.unwrap();

        svc.incident_detail(&admin(), &receipt.incident_id, &client_meta())
            .await
            .unwrap();
        svc.update_status(
            &admin(),
            &receipt.incident_id,
            "in_progress",
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        assert!(trail.len() >= 3);
        for entry in &trail {
            assert_eq!(entry.ip_address, None, "entry {} leaked an IP", entry.action);
        }
    }

    #[tokio::test]
    async fn audit_failure_never_aborts_the_operation() {
        let app_data = setup_app_data_with_broken_audit().await;
        let svc = service(&app_data);

        // Every audit insert fails against the unmigrated audit database,
        // yet submission and status change both succeed.
        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.update_status(
            &admin(),
            &receipt.incident_id,
            "in_progress",
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        let stored = app_data
            .incident_store
            .find_by_id(&receipt.incident_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, "in_progress");
    }

    #[tokio::test]
    async fn submit_rejects_future_incident_dates() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let submission = SubmitIncident {
            incident_date: "2099-01-01".to_string(),
            ..sample_submission()
        };
        let err = svc.submit(submission, &client_meta()).await.unwrap_err();
        assert!(matches!(err, SafetyError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_rejects_unknown_severity_and_type() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let bad_severity = SubmitIncident {
            severity: "catastrophic".to_string(),
            ..sample_submission()
        };
        assert!(matches!(
            svc.submit(bad_severity, &client_meta()).await.unwrap_err(),
            SafetyError::Validation(_)
        ));

        let bad_type = SubmitIncident {
            incident_type: "mystery".to_string(),
            ..sample_submission()
        };
        assert!(matches!(
            svc.submit(bad_type, &client_meta()).await.unwrap_err(),
            SafetyError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn submit_generates_title_when_none_supplied() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let submission = SubmitIncident {
            title: None,
            ..sample_submission()
        };
        let receipt = svc.submit(submission, &client_meta()).await.unwrap();

        let stored = app_data
            .incident_store
            .find_by_id(&receipt.incident_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "equipment_failure - 2024-03-10");
    }

    #[tokio::test]
    async fn status_lookup_by_reference() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        let view = svc
            .status_by_reference(&receipt.reference_number)
            .await
            .unwrap();
        assert_eq!(view.status, "new");
        assert!(view.can_follow_up);

        let err = svc
            .status_by_reference("SAF-20240101-ZZZZ")
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::NotFound(_)));
    }

    #[tokio::test]
    async fn detail_requires_access_and_decrypts_fields() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        // An unrelated coordinator is denied before any decryption
        let err = svc
            .incident_detail(&coordinator(), &receipt.incident_id, &client_meta())
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::AccessDenied(_)));

        let detail = svc
            .incident_detail(&admin(), &receipt.incident_id, &client_meta())
            .await
            .unwrap();
        assert_eq!(
            detail.description,
            "A ceiling anchor slipped during load testing"
        );
        assert_eq!(detail.involved_parties.as_deref(), Some("R. Example"));
        assert_eq!(
            detail.contact_email.as_deref(),
            Some("reporter@example.org")
        );

        // The successful view left a trail entry
        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        assert!(trail.iter().any(|e| e.action == "Viewed"));
    }

    #[tokio::test]
    async fn reporter_is_denied_the_staff_detail_view() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.assign_coordinator(
            &admin(),
            &receipt.incident_id,
            Some("coord-1".to_string()),
            Some("Casey Coordinator".to_string()),
            &client_meta(),
        )
        .await
        .unwrap();

        // The coordinator's view writes a trail entry carrying their IP
        svc.incident_detail(&coordinator(), &receipt.incident_id, &client_meta())
            .await
            .unwrap();

        // The reporter tracks their own submission through my-reports; the
        // staff projection with coordinator identity and the audit trail is
        // off limits even to them.
        let err = svc
            .incident_detail(&reporter(), &receipt.incident_id, &client_meta())
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::AccessDenied(_)));

        let mine = svc
            .my_report_detail(&reporter(), &receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(
            mine.description,
            "A ceiling anchor slipped during load testing"
        );
    }

    #[tokio::test]
    async fn assign_coordinator_is_admin_only_and_atomic_with_its_note() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        let err = svc
            .assign_coordinator(
                &coordinator(),
                &receipt.incident_id,
                Some("coord-1".to_string()),
                None,
                &client_meta(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::AccessDenied(_)));

        svc.assign_coordinator(
            &admin(),
            &receipt.incident_id,
            Some("coord-1".to_string()),
            Some("Casey Coordinator".to_string()),
            &client_meta(),
        )
        .await
        .unwrap();

        let stored = app_data
            .incident_store
            .find_by_id(&receipt.incident_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.coordinator_id.as_deref(), Some("coord-1"));

        let notes = app_data
            .note_store
            .list_for_incident(&receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NoteKind::System.as_str());
        assert!(!notes[0].is_private);
        assert_eq!(notes[0].author_id, None);

        let content = app_data
            .encryption_service
            .decrypt(&notes[0].encrypted_content)
            .unwrap();
        assert_eq!(content, "Assigned to Casey Coordinator by Alex Admin");

        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        assert!(trail.iter().any(|e| e.action == "Assigned"));
    }

    #[tokio::test]
    async fn status_change_writes_exactly_one_note_and_one_audit_entry() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.update_status(
            &admin(),
            &receipt.incident_id,
            "under_review",
            Some("Escalated after triage"),
            &client_meta(),
        )
        .await
        .unwrap();

        let notes = app_data
            .note_store
            .list_for_incident(&receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);
        let content = app_data
            .encryption_service
            .decrypt(&notes[0].encrypted_content)
            .unwrap();
        assert!(content.contains("new"));
        assert!(content.contains("under_review"));
        assert!(content.contains("Escalated after triage"));

        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        let status_entries: Vec<_> = trail
            .iter()
            .filter(|e| e.action == "StatusChanged")
            .collect();
        assert_eq!(status_entries.len(), 1);
        assert!(status_entries[0]
            .before_state
            .as_deref()
            .unwrap()
            .contains("new"));
        assert!(status_entries[0]
            .after_state
            .as_deref()
            .unwrap()
            .contains("under_review"));
    }

    #[tokio::test]
    async fn terminal_statuses_refuse_further_transitions() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.update_status(&admin(), &receipt.incident_id, "closed", None, &client_meta())
            .await
            .unwrap();

        let err = svc
            .update_status(
                &admin(),
                &receipt.incident_id,
                "in_progress",
                None,
                &client_meta(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::Validation(_)));

        // Reassignment stays possible on a closed incident
        svc.assign_coordinator(
            &admin(),
            &receipt.incident_id,
            Some("coord-1".to_string()),
            None,
            &client_meta(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn coordinator_may_change_status_of_their_own_incident_only() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let first = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();
        let second = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.assign_coordinator(
            &admin(),
            &first.incident_id,
            Some("coord-1".to_string()),
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        svc.update_status(
            &coordinator(),
            &first.incident_id,
            "in_progress",
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        let err = svc
            .update_status(
                &coordinator(),
                &second.incident_id,
                "in_progress",
                None,
                &client_meta(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn external_links_update_leaves_note_and_audit_entry() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.update_external_links(
            &admin(),
            &receipt.incident_id,
            Some("https://docs.example.org/folder/1".to_string()),
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        let stored = app_data
            .incident_store
            .find_by_id(&receipt.incident_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored.external_folder_url.as_deref(),
            Some("https://docs.example.org/folder/1")
        );
        assert_eq!(stored.external_report_url, None);

        let notes = app_data
            .note_store
            .list_for_incident(&receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);

        let trail = app_data
            .audit_logger
            .trail(&receipt.incident_id)
            .await
            .unwrap();
        assert!(trail.iter().any(|e| e.action == "ExternalLinksUpdated"));
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_coordinator_for_non_admins() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let mine = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();
        let _other = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.assign_coordinator(
            &admin(),
            &mine.incident_id,
            Some("coord-1".to_string()),
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        let admin_page = svc
            .list_incidents(&admin(), &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(admin_page.total, 2);

        // The coordinator sees only their assignment, even when the query
        // asks for everything
        let coord_page = svc
            .list_incidents(&coordinator(), &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(coord_page.total, 1);
        assert_eq!(coord_page.items[0].id, mine.incident_id);
        assert_eq!(coord_page.items[0].note_count, 1);
    }

    #[tokio::test]
    async fn listing_drops_unparseable_filter_tokens() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        svc.submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        let query = ListQuery {
            statuses: Some("new,bogus,".to_string()),
            types: Some("equipment_failure,alien_abduction".to_string()),
            ..ListQuery::default()
        };

        let page = svc.list_incidents(&admin(), &query).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn listing_preview_is_bounded() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let submission = SubmitIncident {
            description: "x".repeat(1000),
            ..sample_submission()
        };
        svc.submit(submission, &client_meta()).await.unwrap();

        let page = svc
            .list_incidents(&admin(), &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.items[0].description_preview.chars().count(), 203);
        assert!(page.items[0].description_preview.ends_with("..."));
    }

    #[tokio::test]
    async fn dashboard_counts_unassigned_and_scopes_recent_list() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let first = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();
        let _second = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        svc.assign_coordinator(
            &admin(),
            &first.incident_id,
            Some("coord-1".to_string()),
            None,
            &client_meta(),
        )
        .await
        .unwrap();

        let stats = svc.dashboard_stats(&admin()).await.unwrap();
        assert_eq!(stats.unassigned_open, 1);
        assert!(!stats.has_stale_unassigned);
        assert_eq!(stats.recent_open.len(), 2);

        let coord_stats = svc.dashboard_stats(&coordinator()).await.unwrap();
        assert_eq!(coord_stats.unassigned_open, 1);
        assert_eq!(coord_stats.recent_open.len(), 1);
        assert_eq!(coord_stats.recent_open[0].id, first.incident_id);
    }

    #[tokio::test]
    async fn my_reports_shows_reduced_projection_of_own_incidents() {
        let app_data = setup_app_data().await;
        let svc = service(&app_data);

        let receipt = svc
            .submit(sample_submission(), &client_meta())
            .await
            .unwrap();

        let anonymous = SubmitIncident {
            is_anonymous: true,
            ..sample_submission()
        };
        svc.submit(anonymous, &client_meta()).await.unwrap();

        let page = svc.my_reports(&reporter(), None, None).await.unwrap();
        // The anonymous submission is not linked to the reporter
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, receipt.incident_id);

        let detail = svc
            .my_report_detail(&reporter(), &receipt.incident_id)
            .await
            .unwrap();
        assert_eq!(
            detail.description,
            "A ceiling anchor slipped during load testing"
        );

        // Someone else's incident looks exactly like a missing one
        let other = crate::types::internal::Actor::new("stranger-1", false);
        let err = svc
            .my_report_detail(&other, &receipt.incident_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SafetyError::NotFound(_)));
    }
}
