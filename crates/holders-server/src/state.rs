use std::sync::Arc;

use holders_replication::ShareService;
use holders_store::ReadStore;

/// Shared handles every request handler needs.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ShareService>,
    pub store: Arc<dyn ReadStore>,
}

impl AppState {
    pub fn new(service: Arc<ShareService>, store: Arc<dyn ReadStore>) -> Self {
        Self { service, store }
    }
}
