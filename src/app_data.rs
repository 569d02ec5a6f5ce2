use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::audit::AuditLogger;
use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::services::{DateRandomGenerator, EncryptionService, ReferenceNumberGenerator};
use crate::stores::{AuditStore, IncidentStore, NoteStore};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across services.
/// Services extract what they need in their constructors, so their
/// signatures stay stable as dependencies grow.
pub struct AppData {
    pub db: DatabaseConnection,
    pub secret_manager: Arc<SecretManager>,
    pub encryption_service: Arc<EncryptionService>,
    pub incident_store: Arc<IncidentStore>,
    pub note_store: Arc<NoteStore>,
    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub reference_generator: Arc<dyn ReferenceNumberGenerator>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// The database should be connected and migrated before calling this.
    ///
    /// # Errors
    /// Returns `InternalError` when secret manager initialization fails;
    /// a missing or malformed encryption key aborts startup here.
    pub async fn init(db: DatabaseConnection) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let secret_manager = Arc::new(SecretManager::init().map_err(|e| {
            InternalError::parse("secret_manager", format!("Secret manager init failed: {}", e))
        })?);

        let encryption_service = Arc::new(EncryptionService::new(secret_manager.encryption_key()));

        let incident_store = Arc::new(IncidentStore::new(db.clone()));
        let note_store = Arc::new(NoteStore::new(db.clone()));
        let audit_store = Arc::new(AuditStore::new(db.clone()));

        let audit_logger = Arc::new(AuditLogger::new(
            audit_store.clone(),
            incident_store.clone(),
        ));

        let reference_generator: Arc<dyn ReferenceNumberGenerator> =
            Arc::new(DateRandomGenerator);

        tracing::info!("AppData initialization complete");

        Ok(Self {
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
}
