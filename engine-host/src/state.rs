//! Shared application state for the host server.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use engine::Endpoint;
use engine::io::config::EngineConfig;

/// Component name → registered component. Read-only once the server starts.
#[derive(Default)]
pub struct Registry {
    components: BTreeMap<String, Arc<dyn Endpoint>>,
}

impl Registry {
    pub fn register(&mut self, endpoint: Arc<dyn Endpoint>) -> Result<()> {
        let name = endpoint.name().to_string();
        if self.components.contains_key(&name) {
            bail!("component '{}' registered twice", name);
        }
        self.components.insert(name, endpoint);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Endpoint>> {
        self.components.get(name)
    }

    /// Components in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Endpoint>> {
        self.components.values()
    }
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(registry: Registry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }
}
