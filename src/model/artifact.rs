//! Model artifact resolution
//!
//! The trained classifier ships as an ONNX file plus a JSON metadata sidecar
//! (ordered feature columns, category vocabularies, training target).
//! Resolution order: local path first, then the hub, cached on disk by
//! filename. Both files are loaded once at startup and never reloaded.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model metadata: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("hub fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("model load failed: {0}")]
    Load(String),
}

/// Where the active model artifact came from, reported by `/health`.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Local(PathBuf),
    Hub { repo: String, filename: String },
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Local(path) => write!(f, "{}", path.display()),
            ModelSource::Hub { repo, filename } => write!(f, "hub:{}/{}", repo, filename),
        }
    }
}

/// Metadata sidecar written at training time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Trained feature columns, order-sensitive
    pub feature_columns: Vec<String>,

    /// Per-column category vocabulary (ordinal codes learned at training)
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    /// Per-column fill value for absent features; zero when undeclared
    #[serde(default)]
    pub defaults: BTreeMap<String, serde_json::Value>,

    #[serde(default = "default_target")]
    pub target: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Training-time metrics, carried along for operators
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

fn default_target() -> String {
    "attrition".to_string()
}

fn default_version() -> String {
    "rf_reg@v1".to_string()
}

impl ModelMeta {
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let raw = fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Resolved artifact: classifier file on disk plus its parsed metadata.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub meta: ModelMeta,
    pub source: ModelSource,
    pub model_path: PathBuf,
}

impl ModelArtifact {
    /// Resolve the model and its metadata, preferring local files over the
    /// hub fallback. Failure here is fatal for startup.
    pub async fn resolve(config: &Config) -> Result<Self, ArtifactError> {
        let (model_path, source) = resolve_file(
            Path::new(&config.model_path),
            &config.hub_repo,
            &config.hub_model_file,
        )
        .await?;

        let (meta_path, _) = resolve_file(
            Path::new(&config.meta_path),
            &config.hub_repo,
            &config.hub_meta_file,
        )
        .await?;

        let meta = ModelMeta::from_file(&meta_path)?;
        if meta.feature_columns.is_empty() {
            return Err(ArtifactError::Load(
                "metadata declares no feature columns".to_string(),
            ));
        }

        Ok(Self {
            meta,
            source,
            model_path,
        })
    }
}

/// Return a readable path for `filename`, fetching from the hub into the
/// cache directory when the local path is absent. Cached files are reused
/// across restarts.
async fn resolve_file(
    local: &Path,
    repo: &str,
    filename: &str,
) -> Result<(PathBuf, ModelSource), ArtifactError> {
    if local.exists() {
        return Ok((local.to_path_buf(), ModelSource::Local(local.to_path_buf())));
    }

    let source = ModelSource::Hub {
        repo: repo.to_string(),
        filename: filename.to_string(),
    };

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("attrition-api");
    let cached = cache_dir.join(filename);
    if cached.exists() {
        return Ok((cached, source));
    }

    let url = format!("https://huggingface.co/{}/resolve/main/{}", repo, filename);
    tracing::info!("Local artifact missing, fetching {} from {}", filename, url);

    let response = reqwest::get(&url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ArtifactError::Fetch {
            url: url.clone(),
            message: e.to_string(),
        })?;
    let bytes = response.bytes().await.map_err(|e| ArtifactError::Fetch {
        url: url.clone(),
        message: e.to_string(),
    })?;

    fs::create_dir_all(&cache_dir).map_err(|e| ArtifactError::Io {
        path: cache_dir.display().to_string(),
        source: e,
    })?;
    fs::write(&cached, &bytes).map_err(|e| ArtifactError::Io {
        path: cached.display().to_string(),
        source: e,
    })?;

    tracing::info!("Cached {} ({} bytes)", cached.display(), bytes.len());
    Ok((cached, source))
}
