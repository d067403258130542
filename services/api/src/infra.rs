use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use strainpoint::assessment::relationship::{bundled_catalog, bundled_strategies};
use strainpoint::assessment::{
    Catalog, CatalogError, CompatibilityPoint, SessionId, SessionStore, StoreError, StrategyTable,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session store for the HTTP service.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    payloads: Arc<Mutex<HashMap<SessionId, String>>>,
}

impl InMemorySessionStore {
    fn poisoned() -> StoreError {
        StoreError::Unavailable("session store mutex poisoned".to_string())
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, id: &SessionId, payload: String) -> Result<(), StoreError> {
        let mut guard = self.payloads.lock().map_err(|_| Self::poisoned())?;
        guard.insert(id.clone(), payload);
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<String>, StoreError> {
        let guard = self.payloads.lock().map_err(|_| Self::poisoned())?;
        Ok(guard.get(id).cloned())
    }

    fn discard(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut guard = self.payloads.lock().map_err(|_| Self::poisoned())?;
        guard.remove(id);
        Ok(())
    }
}

/// Catalog from `path`, or the bundled relationship catalog.
pub(crate) fn load_catalog(
    path: Option<&Path>,
) -> Result<Catalog<CompatibilityPoint>, CatalogError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading catalog");
            Catalog::from_reader(BufReader::new(File::open(path)?))
        }
        None => bundled_catalog(),
    }
}

pub(crate) fn load_strategies(
    path: Option<&Path>,
) -> Result<StrategyTable<CompatibilityPoint>, CatalogError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading strategies");
            let raw = std::fs::read_to_string(path)?;
            Ok(StrategyTable::from_json_str(&raw)?)
        }
        None => bundled_strategies(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_round_trips_payloads() {
        let store = InMemorySessionStore::default();
        let id = SessionId::from("session-000001");

        store.save(&id, "{}".to_string()).expect("save");
        assert_eq!(store.load(&id).expect("load").as_deref(), Some("{}"));

        store.discard(&id).expect("discard");
        assert_eq!(store.load(&id).expect("load"), None);
    }

    #[test]
    fn bundled_data_is_used_without_paths() {
        let catalog = load_catalog(None).expect("bundled catalog");
        assert_eq!(catalog.len(), 20);
        assert!(load_strategies(None).is_ok());
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        let result = load_catalog(Some(Path::new("/nonexistent/catalog.json")));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
