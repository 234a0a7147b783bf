pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod latency;
pub mod simulator;
pub mod store;
pub mod token;
pub mod types;

use config::SimulatorConfig;
use latency::Latency;
use std::sync::Arc;
use store::CredentialStore;

/// Shared simulator state
pub struct AppState {
    pub store: CredentialStore,
    pub latency: Arc<dyn Latency>,
    pub config: SimulatorConfig,
}

impl AppState {
    pub fn new(
        store: CredentialStore,
        latency: impl Latency + 'static,
        config: SimulatorConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            latency: Arc::new(latency),
            config,
        })
    }

    /// Seeded store with the latency range taken from `config`
    pub fn from_config(config: SimulatorConfig) -> Arc<Self> {
        let latency = config.latency();
        Self::new(CredentialStore::seeded(), latency, config)
    }
}
