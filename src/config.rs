//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Audit store connection URL (auditing disabled when unset)
    pub database_url: Option<String>,

    /// Server port
    pub port: u16,

    /// Local model artifact path
    pub model_path: String,

    /// Local model metadata path
    pub meta_path: String,

    /// Hub repository for the artifact fallback
    pub hub_repo: String,

    /// Artifact filename on the hub
    pub hub_model_file: String,

    /// Metadata filename on the hub
    pub hub_meta_file: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/model.onnx".to_string()),

            meta_path: env::var("MODEL_META_PATH")
                .unwrap_or_else(|_| "models/model.meta.json".to_string()),

            hub_repo: env::var("HUB_REPO_ID")
                .unwrap_or_else(|_| "veranoscience/attrition-model".to_string()),

            hub_model_file: env::var("HUB_MODEL_FILENAME")
                .unwrap_or_else(|_| "model.onnx".to_string()),

            hub_meta_file: env::var("HUB_META_FILENAME")
                .unwrap_or_else(|_| "model.meta.json".to_string()),
        }
    }
}
