// Test utilities shared across unit and integration tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::SecretManager;
use crate::services::{DateRandomGenerator, EncryptionService, ReferenceNumberGenerator};
use crate::services::safety_service::SubmitIncident;
use crate::stores::{AuditStore, IncidentStore, NoteStore};
use crate::types::internal::{Actor, ClientMeta};

/// Fixed 32-byte key so test data stays decryptable across helpers
pub const TEST_KEY: [u8; 32] = [42u8; 32];

/// Create a fresh in-memory database with all migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Build AppData over an in-memory database with a fixed encryption key
///
/// Constructed directly rather than through `AppData::init` so tests never
/// depend on process environment variables.
pub async fn setup_app_data() -> Arc<AppData> {
    let db = setup_test_db().await;
    app_data_on(db)
}

/// Wire AppData onto an existing connection
pub fn app_data_on(db: DatabaseConnection) -> Arc<AppData> {
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

/// AppData whose audit trail writes always fail
///
/// The audit store is pointed at a second, unmigrated database, so every
/// insert errors while the business tables still work. Used to verify that
/// audit failures never abort the triggering operation.
pub async fn setup_app_data_with_broken_audit() -> Arc<AppData> {
    let db = setup_test_db().await;

    let broken_db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create broken audit database");

    let secret_manager = Arc::new(SecretManager::from_key(TEST_KEY));
    let encryption_service = Arc::new(EncryptionService::new(secret_manager.encryption_key()));

    let incident_store = Arc::new(IncidentStore::new(db.clone()));
    let note_store = Arc::new(NoteStore::new(db.clone()));
    let audit_store = Arc::new(AuditStore::new(broken_db));
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

/// Baseline valid submission; tests override the fields they care about
pub fn sample_submission() -> SubmitIncident {
    SubmitIncident {
        title: Some("Rigging point failure".to_string()),
        severity: "high".to_string(),
        incident_type: "equipment_failure".to_string(),
        location: "Main hall".to_string(),
        incident_date: "2024-03-10".to_string(),
        description: "A ceiling anchor slipped during load testing".to_string(),
        involved_parties: Some("R. Example".to_string()),
        witnesses: Some("Two volunteers".to_string()),
        contact_email: Some("reporter@example.org".to_string()),
        contact_phone: None,
        is_anonymous: false,
        request_follow_up: true,
        reporter_id: Some("reporter-1".to_string()),
    }
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
        Some("test-agent/1.0".to_string()),
    )
}
