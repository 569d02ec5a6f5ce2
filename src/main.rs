use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use poem::{listener::TcpListener, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};

use safety_incident_backend::api::{HealthApi, SafetyApi};
use safety_incident_backend::app_data::AppData;
use safety_incident_backend::config::init_logging;
use safety_incident_backend::services::{NotesService, SafetyService};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://incidents.db?mode=rwc".to_string());

    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!(database_url = %database_url, "connected to database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("database migrations completed");

    // A missing or malformed ENCRYPTION_KEY fails here, before anything binds
    let app_data = Arc::new(
        AppData::init(db)
            .await
            .expect("Failed to initialize application data"),
    );

    let safety_service = Arc::new(SafetyService::new(app_data.clone()));
    let notes_service = Arc::new(NotesService::new(app_data.clone()));
    let safety_api = SafetyApi::new(safety_service, notes_service);

    let api_service = OpenApiService::new(
        (HealthApi, safety_api),
        "Safety Incident Backend",
        env!("CARGO_PKG_VERSION"),
    )
    .server("http://localhost:3000/api");

    let ui = api_service.swagger_ui();

    let app = Route::new().nest("/api", api_service).nest("/swagger", ui);

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!(addr = %bind_addr, "starting server");

    Server::new(TcpListener::bind(bind_addr)).run(app).await
}
