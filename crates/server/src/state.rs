use std::sync::Arc;

use medialog_discovery::service::DiscoveryService;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub discovery: Arc<DiscoveryService>,
}

impl AppState {
    pub fn new(discovery: DiscoveryService) -> Self {
        Self {
            discovery: Arc::new(discovery),
        }
    }
}
