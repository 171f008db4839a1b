//! Audit store - optional PostgreSQL persistence for scoring events
//!
//! Best-effort by contract: when the store is missing or broken the rest of
//! the service behaves exactly as if auditing were never configured.

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Apply the audit schema
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    tracing::info!("Audit schema applied successfully");
    Ok(())
}

/// Audit schema SQL
const SCHEMA_SQL: &str = r#"
-- Scoring events (one row per request, or per batch for /predict_proba)
CREATE TABLE IF NOT EXISTS predictions_log (
    id BIGSERIAL PRIMARY KEY,
    request_id UUID NOT NULL,
    source VARCHAR(50) NOT NULL,
    input_payload JSONB NOT NULL,
    proba DOUBLE PRECISION,
    pred SMALLINT,
    threshold DOUBLE PRECISION NOT NULL,
    model_version VARCHAR(100) NOT NULL,
    status VARCHAR(20) NOT NULL,
    error_message TEXT,
    created_at TIMESTAMPTZ DEFAULT NOW()
);

-- Chronological retrieval
CREATE INDEX IF NOT EXISTS idx_predictions_log_created ON predictions_log(created_at);
"#;

/// One audit row. Written once, never mutated.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub source: &'static str,
    pub input_payload: serde_json::Value,
    pub proba: Option<f64>,
    pub pred: Option<i16>,
    pub threshold: f64,
    pub model_version: String,
    pub status: &'static str,
    pub error_message: Option<String>,
}

impl AuditEntry {
    pub fn ok(
        source: &'static str,
        input_payload: serde_json::Value,
        proba: Option<f64>,
        pred: Option<i16>,
        threshold: f64,
        model_version: &str,
    ) -> Self {
        Self {
            source,
            input_payload,
            proba,
            pred,
            threshold,
            model_version: model_version.to_string(),
            status: "ok",
            error_message: None,
        }
    }

    pub fn error(
        source: &'static str,
        input_payload: serde_json::Value,
        threshold: f64,
        model_version: &str,
        message: String,
    ) -> Self {
        Self {
            source,
            input_payload,
            proba: None,
            pred: None,
            threshold,
            model_version: model_version.to_string(),
            status: "error",
            error_message: Some(message),
        }
    }
}

/// Destination for audit entries. Implementations must never raise and
/// never block the caller materially.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
    fn is_enabled(&self) -> bool;
}

/// Fire-and-forget audit writer shared across requests.
#[derive(Clone)]
pub struct AuditLogger {
    pool: Option<PgPool>,
}

impl AuditLogger {
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Connect, ping and migrate once at startup. Any failure disables
    /// auditing for the process lifetime; there are no reconnect attempts.
    pub async fn connect(database_url: Option<&str>) -> Self {
        let Some(url) = database_url else {
            tracing::info!("No DATABASE_URL set, audit logging disabled");
            return Self::disabled();
        };

        match try_connect(url).await {
            Ok(pool) => {
                tracing::info!("Audit store enabled");
                Self { pool: Some(pool) }
            }
            Err(e) => {
                tracing::warn!("Audit store unreachable, audit logging disabled: {}", e);
                Self::disabled()
            }
        }
    }

}

impl AuditSink for AuditLogger {
    /// At-most-once insert on a spawned task. Never raises to the caller and
    /// adds no latency to the response path; a failed insert is dropped after
    /// an operational warning.
    fn record(&self, entry: AuditEntry) {
        let Some(pool) = self.pool.clone() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(e) = insert(&pool, &entry).await {
                tracing::warn!("Audit insert failed, entry dropped: {}", e);
            }
        });
    }

    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }
}

async fn try_connect(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = create_pool(url).await?;
    // cold liveness ping before committing to the pool
    sqlx::query("SELECT 1").execute(&pool).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn insert(pool: &PgPool, entry: &AuditEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO predictions_log
        (request_id, source, input_payload, proba, pred, threshold, model_version, status, error_message)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.source)
    .bind(&entry.input_payload)
    .bind(entry.proba)
    .bind(entry.pred)
    .bind(entry.threshold)
    .bind(&entry.model_version)
    .bind(entry.status)
    .bind(&entry.error_message)
    .execute(pool)
    .await?;
    Ok(())
}
