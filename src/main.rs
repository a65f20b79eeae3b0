use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tutor_market::config::{Settings, StorageBackend};
use tutor_market::error::{json_error_handler, path_error_handler, query_error_handler};
use tutor_market::routes::{self, AppState};
use tutor_market::services::{JwtVerifier, MemoryStore, PostgresStore, StoreError};

fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

async fn build_state(settings: &Settings) -> Result<AppState, StoreError> {
    let verifier = JwtVerifier::new(&settings.auth.jwt_secret);

    match settings.storage.backend {
        StorageBackend::Postgres => {
            let store = Arc::new(PostgresStore::from_settings(&settings.database).await?);
            info!("PostgreSQL store initialized");
            Ok(AppState::new(store.clone(), store, verifier))
        }
        StorageBackend::Memory => {
            let store = match &settings.storage.seed_file {
                Some(path) => MemoryStore::from_seed_file(path)?,
                None => MemoryStore::new(),
            };
            let store = Arc::new(store);
            info!("In-memory store initialized");
            Ok(AppState::new(store.clone(), store, verifier))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting tutor market service...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    let app_state = build_state(&settings).await.map_err(|e| {
        error!("Failed to initialize store: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
