// src/bin/api_server.rs

use roaming_fighter::infra::telemetry::init_tracing;
use roaming_fighter::transport;
use roaming_fighter::{Config, PostgresStore, Repositories, StorageBackend};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // --- Storage Initialization ---
    let repos = match config.storage_backend {
        StorageBackend::Postgres => {
            tracing::info!("initializing postgres storage");
            Repositories::postgres(PostgresStore::connect(&config).await?)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, nothing survives a restart");
            Repositories::in_memory()
        }
    };
    let app_state = transport::http::AppState::new(repos);

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "API server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
