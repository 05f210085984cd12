use metrics_exporter_prometheus::PrometheusHandle;
use roomdraw::config::StorageConfig;
use roomdraw::housing::{HousingSeed, InMemoryEntityStore, SeedError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the in-memory store, seeded from the configured fixture when one is set.
pub(crate) fn load_store(config: &StorageConfig) -> Result<InMemoryEntityStore, SeedError> {
    match &config.seed_file {
        Some(path) => {
            let store = HousingSeed::from_path(path)?.into_store()?;
            info!(seed_file = %path.display(), "entity store seeded");
            Ok(store)
        }
        None => Ok(InMemoryEntityStore::new()),
    }
}
