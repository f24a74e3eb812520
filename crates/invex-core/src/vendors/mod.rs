//! Vendor knowledge: master data, name resolution and field overrides.

mod builtin;
mod catalog;
mod registry;

pub use catalog::{VendorCatalog, VendorMatch};
pub use registry::{CustomExtractor, LabelPlan, OverrideAction, OverrideContext, OverrideRegistry};

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::error::Result;
use crate::models::VendorConfig;

/// One consistent view of the vendor catalog and override rules.
#[derive(Debug, Clone, Default)]
pub struct VendorState {
    pub catalog: VendorCatalog,
    pub registry: Arc<OverrideRegistry>,
}

/// Shared, reloadable vendor state.
///
/// Readers take an `Arc` snapshot and keep using it for a whole document;
/// a reload swaps in a new state without disturbing snapshots in use.
#[derive(Debug, Default)]
pub struct VendorCache {
    state: RwLock<Arc<VendorState>>,
}

impl VendorCache {
    /// Cache over the given catalog and registry.
    pub fn new(catalog: VendorCatalog, registry: OverrideRegistry) -> Self {
        Self {
            state: RwLock::new(Arc::new(VendorState {
                catalog,
                registry: Arc::new(registry),
            })),
        }
    }

    /// Cache with built-in overrides and the configured master data.
    pub fn from_config(config: &VendorConfig) -> Result<Self> {
        let mut catalog = match &config.master_data {
            Some(path) => VendorCatalog::from_file(path)?,
            None => VendorCatalog::new(),
        };
        catalog.merge_identifiers(&config.manual_identifiers);
        catalog.validate()?;
        Ok(Self::new(catalog, OverrideRegistry::builtin()))
    }

    /// The current state.
    pub fn snapshot(&self) -> Arc<VendorState> {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the catalog, keeping the registry.
    pub fn reload_catalog(&self, catalog: VendorCatalog) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        let registry = Arc::clone(&guard.registry);
        info!("Reloaded vendor catalog with {} vendors", catalog.vendors.len());
        *guard = Arc::new(VendorState { catalog, registry });
    }

    /// Replace the whole state.
    pub fn reload(&self, catalog: VendorCatalog, registry: OverrideRegistry) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(VendorState {
            catalog,
            registry: Arc::new(registry),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::Field;

    #[test]
    fn test_snapshot_survives_reload() {
        let cache = VendorCache::new(
            VendorCatalog::new().with_vendor("Helinox", "V1"),
            OverrideRegistry::builtin(),
        );
        let before = cache.snapshot();

        cache.reload_catalog(VendorCatalog::new().with_vendor("Oboz", "V2"));
        let after = cache.snapshot();

        assert_eq!(before.catalog.vendor_number("Helinox"), Some("V1"));
        assert_eq!(after.catalog.vendor_number("Helinox"), None);
        assert_eq!(after.catalog.vendor_number("Oboz"), Some("V2"));
        assert!(after.registry.has_vendor("Helinox"));
    }

    #[test]
    fn test_reload_replaces_registry() {
        let cache = VendorCache::new(VendorCatalog::new(), OverrideRegistry::builtin());
        cache.reload(VendorCatalog::new(), OverrideRegistry::new());
        assert!(
            cache
                .snapshot()
                .registry
                .actions("Helinox", Field::InvoiceNumber)
                .is_empty()
        );
    }

    #[test]
    fn test_from_config_merges_manual_identifiers() {
        let config = VendorConfig {
            master_data: None,
            manual_identifiers: BTreeMap::from([("ACME CO".to_string(), "Acme".to_string())]),
        };
        let cache = VendorCache::from_config(&config).expect("cache");
        let state = cache.snapshot();
        assert_eq!(
            state.catalog.identifiers.get("acme co").map(String::as_str),
            Some("Acme")
        );
        assert!(state.registry.has_vendor("Darn Tough"));
    }

    #[test]
    fn test_concurrent_readers() {
        let cache = Arc::new(VendorCache::new(
            VendorCatalog::new().with_vendor("Helinox", "V1"),
            OverrideRegistry::builtin(),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.snapshot().catalog.vendors.len())
            })
            .collect();
        cache.reload_catalog(VendorCatalog::new().with_vendor("Helinox", "V1"));

        for handle in handles {
            assert_eq!(handle.join().expect("reader thread"), 1);
        }
    }
}
