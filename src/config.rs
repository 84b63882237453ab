//! Application configuration
//!
//! Loaded from a YAML file; every field has a default so an empty file (or no
//! file at all) yields a working setup against a local node.
//!
//! ```yaml
//! rpc:
//!   url: https://dev-seed.rooch.network
//!   max_retries: 2
//!   rate_limit:
//!     requests_per_second: 5
//!     burst_size: 5
//! pagination:
//!   page_size: 25
//!   refresh_interval_ms: 2000
//! server:
//!   port: 9090
//! ```

use crate::driver::DriverConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{PageSizeOptions, PaginationModel};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Node connection
    pub rpc: RpcConfig,

    /// Paging behaviour
    pub pagination: PaginationConfig,

    /// HTTP API settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load and validate a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<()> {
        if self.rpc.url.trim().is_empty() {
            return Err(Error::invalid_value("rpc.url", "must not be empty"));
        }
        url::Url::parse(&self.rpc.url)
            .map_err(|e| Error::invalid_value("rpc.url", e.to_string()))?;

        let options = PageSizeOptions::new(self.pagination.page_size_options.clone())
            .map_err(|e| Error::invalid_value("pagination.page_size_options", e.to_string()))?;
        options
            .validate(self.pagination.page_size)
            .map_err(|e| Error::invalid_value("pagination.page_size", e.to_string()))?;

        // Paces re-fetches of the current page while the node reports more data
        if self.pagination.refresh_interval_ms == 0 {
            return Err(Error::invalid_value(
                "pagination.refresh_interval_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// HTTP client settings for the node
    pub fn http_config(&self) -> HttpClientConfig {
        let rpc = &self.rpc;
        let mut builder = HttpClientConfig::builder()
            .base_url(rpc.url.clone())
            .timeout(Duration::from_secs(rpc.timeout_secs))
            .max_retries(rpc.max_retries)
            .backoff(
                rpc.backoff,
                Duration::from_millis(rpc.initial_backoff_ms),
                Duration::from_millis(rpc.max_backoff_ms),
            );
        builder = match &rpc.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        for (key, value) in &rpc.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }

    /// Driver settings
    pub fn driver_config(&self) -> Result<DriverConfig> {
        Ok(DriverConfig {
            refresh_interval: Duration::from_millis(self.pagination.refresh_interval_ms),
            page_size_options: PageSizeOptions::new(self.pagination.page_size_options.clone())?,
        })
    }

    /// Model for the first page at the configured size
    pub fn initial_model(&self) -> Result<PaginationModel> {
        PaginationModel::new(0, self.pagination.page_size)
    }
}

// ============================================================================
// RPC Config
// ============================================================================

/// Node connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for retryable failures
    pub max_retries: u32,

    /// Backoff strategy between retries
    pub backoff: BackoffType,

    /// First backoff delay
    pub initial_backoff_ms: u64,

    /// Backoff cap
    pub max_backoff_ms: u64,

    /// Client-side rate limit; `null` disables it
    pub rate_limit: Option<RateLimiterConfig>,

    /// Extra headers on every request
    pub headers: HashMap<String, String>,

    /// List newest transactions first
    pub descending: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:6767".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            backoff: BackoffType::Exponential,
            initial_backoff_ms: 100,
            max_backoff_ms: 10_000,
            rate_limit: Some(RateLimiterConfig::default()),
            headers: HashMap::new(),
            descending: true,
        }
    }
}

// ============================================================================
// Pagination Config
// ============================================================================

/// Paging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Initial page size
    pub page_size: u32,

    /// Page sizes a user may pick
    pub page_size_options: Vec<u32>,

    /// Minimum spacing between repeat fetches of the same page
    pub refresh_interval_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_size_options: PageSizeOptions::default().as_slice().to_vec(),
            refresh_interval_ms: 1000,
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port
    pub port: u16,

    /// How long a request waits for the store to reflect a new page
    pub settle_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            settle_timeout_ms: 5000,
        }
    }
}
