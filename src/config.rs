//! Configuration management for the donation guard.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::donation::AuditOptions;
use crate::error::{GuardError, Result};
use crate::ratelimit::RateLimitPolicy;

/// Prefix for environment overrides, e.g. `DONATION_GUARD__RATE_LIMITING__LIMIT=10`.
const ENV_PREFIX: &str = "DONATION_GUARD";

/// Main configuration for the donation guard service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Submission rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Suspicious-activity audit thresholds
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// gRPC server address
    #[serde(default = "default_grpc_addr")]
    pub grpc_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            grpc_addr: default_grpc_addr(),
        }
    }
}

fn default_grpc_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8081))
}

/// Rate limiting configuration, applied to both the IP and the phone key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum accepted requests per identifier inside the window
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Sliding window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_ms: default_window_ms(),
        }
    }
}

fn default_limit() -> u32 {
    RateLimitPolicy::DEFAULT_LIMIT
}

fn default_window_ms() -> u64 {
    RateLimitPolicy::DEFAULT_WINDOW_MS
}

impl RateLimitingConfig {
    /// Validate into a policy. Zero values are rejected rather than clamped.
    pub fn policy(&self) -> Result<RateLimitPolicy> {
        RateLimitPolicy::new(self.limit, self.window_ms)
    }
}

/// Thresholds for the suspicious donation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_window_ms")]
    pub time_window_ms: u64,

    #[serde(default = "default_max_per_ip")]
    pub max_per_ip: usize,

    #[serde(default = "default_max_per_phone")]
    pub max_per_phone: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            time_window_ms: default_audit_window_ms(),
            max_per_ip: default_max_per_ip(),
            max_per_phone: default_max_per_phone(),
        }
    }
}

fn default_audit_window_ms() -> u64 {
    3_600_000
}

fn default_max_per_ip() -> usize {
    10
}

fn default_max_per_phone() -> usize {
    5
}

impl AuditConfig {
    pub fn options(&self) -> AuditOptions {
        AuditOptions {
            time_window: Duration::from_millis(self.time_window_ms),
            max_per_ip: self.max_per_ip,
            max_per_phone: self.max_per_phone,
        }
    }
}

impl GuardConfig {
    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| GuardError::Config(e.to_string()))
    }

    /// Load layered configuration: defaults, then the optional file, then
    /// `DONATION_GUARD__*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(true));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<GuardConfig>())
            .map_err(|e| GuardError::Config(e.to_string()))
    }
}
