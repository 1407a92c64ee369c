//! Transport configuration loading and validation.
//!
//! Config files are YAML (default), JSON or TOML, selected by extension and
//! gated by feature flags. [`resolve_path`] auto-detects `suture.*` in the
//! working directory when no explicit path is given. Submodules provide the
//! data model and validation logic.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::SutureError;
use model::TransportConfig;

/// File names probed, in order, when no config path is given.
pub const CANDIDATES: &[&str] = &["suture.yaml", "suture.yml", "suture.json", "suture.toml"];

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<TransportConfig, SutureError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| SutureError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| SutureError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| SutureError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(SutureError::UnsupportedFormat(other.to_string())),
    }
}

/// Read and parse the config file at `path` without validating it.
pub async fn read(path: &Path) -> Result<TransportConfig, SutureError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SutureError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SutureError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// Read, parse and validate the config file at `path`.
pub async fn load(path: &Path) -> Result<TransportConfig, SutureError> {
    let config = read(path).await?;

    if let Err(errors) = validation::validate(&config) {
        return Err(SutureError::ConfigValidation { errors });
    }

    tracing::debug!(
        path = %path.display(),
        headers = config.headers.len(),
        "loaded transport config"
    );
    Ok(config)
}

/// Use `explicit` when given, otherwise the first existing [`CANDIDATES`]
/// entry in the working directory.
pub async fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    for name in CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Some(path);
        }
    }

    None
}

/// Load the config at `explicit` or the auto-detected path, falling back to
/// defaults when there is none.
pub async fn load_or_default(explicit: Option<&Path>) -> Result<TransportConfig, SutureError> {
    match resolve_path(explicit).await {
        Some(path) => load(&path).await,
        None => Ok(TransportConfig::default()),
    }
}
