//! Settings schema.
//!
//! Every section carries `#[serde(default)]` so a partial file only overrides
//! the keys it names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Debug handler settings
    pub debug: DebugConfig,
    /// Blocking I/O and event wait tuning
    pub io: IoConfig,
    /// Port lookup settings
    pub registry: RegistryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// `[debug]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Whether the default debug handler writes diagnostics to stderr
    pub enabled: bool,
}

/// `[io]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// How often ports without a native handle are probed during a wait
    pub wait_probe_interval_ms: u64,
    /// Device timeout used for each step of a blocking call with no deadline
    pub blocking_slice_ms: u64,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            wait_probe_interval_ms: 10,
            blocking_slice_ms: 1000,
        }
    }
}

impl IoConfig {
    pub fn wait_probe_interval(&self) -> Duration {
        Duration::from_millis(self.wait_probe_interval_ms.max(1))
    }

    pub fn blocking_slice(&self) -> Duration {
        Duration::from_millis(self.blocking_slice_ms.max(1))
    }
}

/// `[registry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Accept existing device nodes that enumeration did not report
    pub include_unlisted_devices: bool,
    /// Port aliases for convenience
    #[serde(default)]
    pub port_aliases: HashMap<String, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_unlisted_devices: true,
            port_aliases: HashMap::new(),
        }
    }
}

impl RegistryConfig {
    /// Resolve a port name through aliases
    pub fn resolve_port(&self, name: &str) -> String {
        self.port_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}
