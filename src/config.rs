//! Application configuration

use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the probe endpoint listens on
    pub port: u16,

    /// Pseudo-file with per-processor descriptors (one entry per logical CPU)
    pub cpuinfo_path: PathBuf,

    /// Pseudo-file with total-memory information
    pub meminfo_path: PathBuf,

    /// Delay applied when a request carries no `delay` parameter, in seconds
    pub default_delay_secs: f64,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PROBE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),

            cpuinfo_path: env::var("PROBE_CPUINFO_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/proc/cpuinfo")),

            meminfo_path: env::var("PROBE_MEMINFO_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/proc/meminfo")),

            default_delay_secs: env::var("PROBE_DEFAULT_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2.0),

            max_body_bytes: env::var("PROBE_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
