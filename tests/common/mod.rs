// Common test utilities for integration tests

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use safety_incident_backend::app_data::AppData;
use safety_incident_backend::audit::AuditLogger;
use safety_incident_backend::config::SecretManager;
use safety_incident_backend::services::safety_service::SubmitIncident;
use safety_incident_backend::services::{
    DateRandomGenerator, EncryptionService, ReferenceNumberGenerator,
};
use safety_incident_backend::stores::{AuditStore, IncidentStore, NoteStore};
use safety_incident_backend::types::internal::{Actor, ClientMeta};

pub const TEST_KEY: [u8; 32] = [42u8; 32];

/// Creates a migrated in-memory database
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Full AppData over an in-memory database with a fixed encryption key
pub async fn setup_app_data() -> Arc<AppData> {
    let db = setup_test_db().await;

    let secret_manager = Arc::new(SecretManager::from_key(TEST_KEY));
    let encryption_service = Arc::new(EncryptionService::new(secret_manager.encryption_key()));

    let incident_store = Arc::new(IncidentStore::new(db.clone()));
    let note_store = Arc::new(NoteStore::new(db.clone()));
    let audit_store = Arc::new(AuditStore::new(db.clone()));
    let audit_logger = Arc::new(AuditLogger::new(audit_store.clone(), incident_store.clone()));
    let reference_generator: Arc<dyn ReferenceNumberGenerator> = Arc::new(DateRandomGenerator);

    Arc::new(AppData {
        db,
        secret_manager,
        encryption_service,
        incident_store,
        note_store,
        audit_store,
        audit_logger,
        reference_generator,
    })
}

pub fn admin() -> Actor {
    Actor::new("admin-1", true).with_display_name("Alex Admin")
}

pub fn coordinator() -> Actor {
    Actor::new("coord-1", false).with_display_name("Casey Coordinator")
}

pub fn reporter() -> Actor {
    Actor::new("reporter-1", false)
}

pub fn client_meta() -> ClientMeta {
    ClientMeta::new(
        Some("203.0.113.7".to_string()),
        Some("integration-test/1.0".to_string()),
    )
}

pub fn sample_submission() -> SubmitIncident {
    SubmitIncident {
        title: Some("Unsecured rigging frame".to_string()),
        severity: "critical".to_string(),
        incident_type: "safety_violation".to_string(),
        location: "Workshop room B".to_string(),
        incident_date: "2024-06-01".to_string(),
        description: "A suspension frame was used without a safety check".to_string(),
        involved_parties: Some("Two members".to_string()),
        witnesses: None,
        contact_email: Some("reporter@example.org".to_string()),
        contact_phone: None,
        is_anonymous: false,
        request_follow_up: true,
        reporter_id: Some("reporter-1".to_string()),
    }
}
