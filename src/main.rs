//! Attrition API
//!
//! Scores employee records against a pre-trained binary attrition classifier
//! over a small request/response surface, and best-effort records every
//! scoring event in PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ATTRITION API                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌───────────────┐   ┌─────────────────┐  │
//! │  │ Handlers │──▶│ ScoringService│──▶│ ONNX Classifier │  │
//! │  │  (Axum)  │   │ align + score │   │ (loaded once)   │  │
//! │  └──────────┘   └──────┬────────┘   └─────────────────┘  │
//! │                        │ fire-and-forget                 │
//! │                        ▼                                 │
//! │                 ┌─────────────┐                          │
//! │                 │ PostgreSQL  │ (optional audit store)   │
//! │                 └─────────────┘                          │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod error;
mod handlers;
mod model;
mod schema;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use model::{ModelArtifact, OnnxClassifier, ScoringService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attrition_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Attrition API starting...");

    // No model, no service: load failure aborts before the listener binds.
    let artifact = ModelArtifact::resolve(&config)
        .await
        .context("failed to resolve model artifact")?;
    tracing::info!(
        "Model {} loaded from {} ({} feature columns, target '{}')",
        artifact.meta.version,
        artifact.source,
        artifact.meta.feature_columns.len(),
        artifact.meta.target
    );
    for (name, value) in &artifact.meta.metrics {
        tracing::debug!("Training metric {} = {}", name, value);
    }

    let classifier = OnnxClassifier::load(&artifact.model_path)
        .context("failed to initialize inference session")?;

    let audit = db::AuditLogger::connect(config.database_url.as_deref()).await;

    let state = AppState {
        model_source: artifact.source.to_string(),
        scorer: Arc::new(ScoringService::new(
            Box::new(classifier),
            artifact.meta,
            Arc::new(audit),
        )),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<ScoringService>,
    pub model_source: String,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::docs::root))
        .route("/docs", get(handlers::docs::docs))
        .route("/health", get(handlers::health::check))
        .route("/predict_one", post(handlers::predict::predict_one))
        .route("/predict_proba", post(handlers::predict::predict_proba))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
