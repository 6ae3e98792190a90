use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default)]
    pub samples: SamplesConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Largest request body accepted from the platform
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 10001))
}

fn default_max_body_bytes() -> usize {
    5 * 1024 * 1024 // 5 MB
}

/// Service identity
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Shared secret (loaded from environment, not from config file)
    #[serde(skip)]
    pub shared_secret: Option<String>,
}

/// Email/push module configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModulesConfig {
    /// Platform base URL; modules fail with "not configured" when absent
    pub baas_url: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ModulesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            baas_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

/// Sample handler tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplesConfig {
    #[serde(default = "default_business_logic_delay_ms")]
    pub business_logic_delay_ms: u64,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            business_logic_delay_ms: default_business_logic_delay_ms(),
        }
    }
}

fn default_business_logic_delay_ms() -> u64 {
    2000
}

/// Deployment sanity checks
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Try a file append at start-up and log whether it worked
    #[serde(default)]
    pub filesystem_probe: bool,
    #[serde(default = "default_probe_path")]
    pub probe_path: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            filesystem_probe: false,
            probe_path: default_probe_path(),
        }
    }
}

fn default_probe_path() -> PathBuf {
    PathBuf::from("message.txt")
}
