//! Shared, reloadable catalog
//!
//! Readers take an `Arc` snapshot and keep using it for the whole request;
//! a reload builds a complete replacement and publishes it in one store, so a
//! reader never observes a half-loaded catalog.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::FocusCatalog;
use crate::config::CatalogConfig;
use crate::error::CatalogResult;

#[derive(Debug)]
pub struct CatalogHandle {
    current: ArcSwap<FocusCatalog>,
}

impl CatalogHandle {
    pub fn new(catalog: FocusCatalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    /// Current catalog; stays valid after later publications
    pub fn snapshot(&self) -> Arc<FocusCatalog> {
        self.current.load_full()
    }

    /// Replace the current catalog, returning the previous one
    pub fn publish(&self, catalog: FocusCatalog) -> Arc<FocusCatalog> {
        self.current.swap(Arc::new(catalog))
    }

    /// Rebuild from `config` and publish; on error the current catalog stays
    pub fn reload(&self, config: &CatalogConfig) -> CatalogResult<()> {
        let catalog = FocusCatalog::load(config)?;
        let previous = self.publish(catalog);
        info!(
            "Catalog reloaded (version {} → {})",
            previous.configured_version(),
            self.current.load().configured_version()
        );
        Ok(())
    }
}
