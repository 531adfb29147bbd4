use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use deal_engine::config::StorageConfig;
use deal_engine::storage::{InMemoryMandateStore, JsonMandateStore, MandateStore, StorageError};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the mandate store the configuration asks for: JSON-file-backed
/// when a path is set, volatile otherwise.
pub(crate) fn build_store(config: &StorageConfig) -> Result<Arc<dyn MandateStore>, StorageError> {
    match &config.mandate_store_path {
        Some(path) => {
            let store = JsonMandateStore::open(path)?;
            info!(path = %path.display(), "using json mandate store");
            Ok(Arc::new(store))
        }
        None => {
            info!("using in-memory mandate store");
            Ok(Arc::new(InMemoryMandateStore::new()))
        }
    }
}
