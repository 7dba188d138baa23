use std::sync::Arc;

use crate::auth::Caller;
use crate::config::Config;
use crate::store::{FileBackend, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        Self { store, config }
    }

    /// State backed by the file named in `config`.
    pub fn from_config(config: Config) -> Self {
        let backend = FileBackend::new(config.store_path(), config.store.atomic_writes);
        let store = Store::new(Arc::new(backend), config.store.preset);
        Self::new(Arc::new(store), config)
    }

    pub fn caller(&self, name: &str) -> Caller {
        Caller::new(name, &self.config.auth.admin_name)
    }
}
