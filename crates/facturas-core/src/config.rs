use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://organizadorfacturasbe.onrender.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 5;

/// Root client configuration, read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub activation: ActivationConfig,
}

/// Timing of the backend wake-up heartbeat.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ActivationConfig {
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_retry_interval_secs() -> u64 {
    DEFAULT_RETRY_INTERVAL_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            activation: ActivationConfig::default(),
        }
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            retry_interval_secs: DEFAULT_RETRY_INTERVAL_SECS,
        }
    }
}

impl ClientConfig {
    /// Base URL without a trailing slash, ready for `format!("{}/api/...")`.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ActivationConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        // A zero interval would spin; clamp to one second.
        Duration::from_secs(self.retry_interval_secs.max(1))
    }
}
