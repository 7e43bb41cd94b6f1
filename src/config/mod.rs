//! Runtime settings for serial_core.
//!
//! Settings are TOML with environment variable overrides.
//!
//! # Resolution
//!
//! 1. `SERIAL_CORE_CONFIG` environment variable (explicit path)
//! 2. `./serial-core.toml` (current directory)
//! 3. `~/.config/serial-core/config.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\serial-core\config.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `SERIAL_CORE_<SECTION>_<KEY>`:
//! - `SERIAL_CORE_DEBUG_ENABLED=1` (or just `SERIAL_CORE_DEBUG`)
//! - `SERIAL_CORE_IO_WAIT_PROBE_INTERVAL_MS=5`
//! - `SERIAL_CORE_LOGGING_LEVEL=debug`
//!
//! # Example
//!
//! ```rust,ignore
//! use serial_core::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! println!("probe interval: {:?}", loader.config().io.wait_probe_interval());
//! ```

mod error;
mod loader;
mod schema;

use once_cell::sync::Lazy;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, DebugConfig, IoConfig, LogFormat, LoggingConfig, RegistryConfig};

static GLOBAL: Lazy<Config> = Lazy::new(|| match ConfigLoader::load() {
    Ok(loader) => loader.into_config(),
    Err(e) => {
        tracing::warn!(error = %e, "falling back to default serial_core settings");
        ConfigLoader::with_defaults().into_config()
    }
});

/// Process-wide settings, loaded once on first use.
pub fn global() -> &'static Config {
    &GLOBAL
}
