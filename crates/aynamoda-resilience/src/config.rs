//! File-backed configuration for [`ErrorHandlingService`](crate::ErrorHandlingService).

use aynamoda_resilience_cache::CacheTtls;
use aynamoda_resilience_core::DEFAULT_ERROR_LOG_CAPACITY;
use aynamoda_resilience_fallback::DEFAULT_MAX_RECOMMENDATIONS;
use aynamoda_resilience_retry::RetryOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tunables for the whole resilience layer.
///
/// Every field is optional in JSON:
///
/// ```json
/// {
///   "retry": { "maxRetries": 2, "baseDelay": 500, "enableOfflineMode": true },
///   "errorLogCapacity": 100,
///   "cacheTtls": { "recommendations": 86400, "weather": 3600, "wardrobe": 86400 },
///   "maxRecommendations": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResilienceConfig {
    /// Defaults for calls that do not pass their own options.
    pub retry: RetryOptions,
    pub error_log_capacity: usize,
    /// Seconds.
    pub cache_ttls: CacheTtls,
    pub max_recommendations: usize,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryOptions::default(),
            error_log_capacity: DEFAULT_ERROR_LOG_CAPACITY,
            cache_ttls: CacheTtls::default(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid resilience config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ResilienceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
