//! TeleChat API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use telechat_common::config::AppConfig;
use telechat_common::db::{create_pool, run_migrations};
use telechat_engine::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use telechat_notifier::{DryRunSender, FcmSender, PushSender};

use telechat_api::routes::create_router;
use telechat_api::state::AppState;

/// Upper bound on request bodies; message previews are short.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "telechat_api=debug,telechat_engine=debug,telechat_notifier=debug,tower_http=debug",
            )
        }))
        .init();

    tracing::info!("Starting TeleChat API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Document store
    let docs: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.db_max_connections).await?;
            run_migrations(&pool).await?;
            Arc::new(PgDocumentStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory document store");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // Push provider
    let push: Arc<dyn PushSender> = match config.fcm_credentials() {
        Some((project_id, access_token)) => {
            let sender = FcmSender::new(&config.fcm_endpoint, project_id, access_token)?;
            tracing::info!(project_id, "FCM sender configured");
            Arc::new(sender)
        }
        None => {
            tracing::warn!("FCM_PROJECT_ID / FCM_ACCESS_TOKEN not set; pushes are dry-run only");
            Arc::new(DryRunSender::new())
        }
    };

    let port = config.api_port;

    // Build application state
    let state = AppState::new(docs, push, config);

    // Build router
    let app = create_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
