use std::sync::Arc;

use crate::config::Config;
use crate::listing::{CatalogStore, PropertyStore};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PropertyStore>,
    pub catalogs: Arc<dyn CatalogStore>,
    pub excluded_states: Arc<[i32]>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PropertyStore>,
        catalogs: Arc<dyn CatalogStore>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            catalogs,
            excluded_states: config.excluded_states.clone().into(),
        }
    }
}
