//! Port discovery and lookup.

mod info;
mod provider;

pub use info::{PortInfo, Transport, UsbIdentity};
pub use provider::{DeviceProvider, MockProvider, NativeProvider};

use crate::config::RegistryConfig;
use crate::diagnostics::track;
use crate::error::{Error, Result};
use crate::port::Port;
use std::sync::Arc;

/// Hands out `Port` objects for the devices a provider knows about.
///
/// The registry keeps no record of the ports it returns; each one is owned by
/// the caller.
#[derive(Debug, Clone)]
pub struct PortRegistry {
    provider: Arc<dyn DeviceProvider>,
    settings: RegistryConfig,
}

impl PortRegistry {
    /// Registry over the host's serial devices, using the global settings.
    pub fn native() -> Self {
        Self::with_provider(Arc::new(NativeProvider))
    }

    pub fn with_provider(provider: Arc<dyn DeviceProvider>) -> Self {
        Self {
            provider,
            settings: crate::config::global().registry.clone(),
        }
    }

    /// Replace the lookup settings taken from the global configuration.
    pub fn with_settings(mut self, settings: RegistryConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn provider(&self) -> &Arc<dyn DeviceProvider> {
        &self.provider
    }

    /// Snapshot of all ports currently present.
    pub fn enumerate(&self) -> Result<Vec<Port>> {
        track("enumerate", || {
            let ports: Vec<Port> = self
                .provider
                .list()?
                .into_iter()
                .map(|info| Port::new(info, Arc::clone(&self.provider)))
                .collect();
            tracing::debug!(count = ports.len(), "Listed ports");
            Ok(ports)
        })
    }

    /// Look a port up by name or configured alias.
    pub fn by_name(&self, name: &str) -> Result<Port> {
        track("by_name", || {
            if name.is_empty() {
                return Err(Error::invalid_arg("port name is empty"));
            }
            let resolved = self.settings.resolve_port(name);
            if resolved != name {
                tracing::debug!(alias = name, port = %resolved, "Resolved port alias");
            }

            // A failed enumeration does not rule out opening the node directly.
            let listed = match self.provider.list() {
                Ok(ports) => ports.into_iter().find(|info| info.name == resolved),
                Err(e) => {
                    tracing::debug!(error = %e, "Enumeration failed during lookup");
                    None
                }
            };
            let info = match listed {
                Some(info) => info,
                None if self.settings.include_unlisted_devices => self
                    .provider
                    .probe_unlisted(&resolved)
                    .ok_or_else(|| Error::not_found(resolved.as_str()))?,
                None => return Err(Error::not_found(resolved.as_str())),
            };
            Ok(Port::new(info, Arc::clone(&self.provider)))
        })
    }

    /// A closed copy of `source` with the same identity.
    pub fn copy(&self, source: &Port) -> Port {
        source.detached_copy()
    }
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::native()
    }
}
