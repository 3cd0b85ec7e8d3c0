//! Backend reachability probe

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::api::client::HEALTH_PATH;
use crate::api::HttpClient;
use crate::models::QueryParams;

pub struct ConnectivityService {
    http: Arc<HttpClient>,
    online: AtomicBool,
}

impl ConnectivityService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            online: AtomicBool::new(true),
        }
    }

    /// Probe the health endpoint. Failures are not escalated to diagnostics.
    pub async fn check_connectivity(&self) -> bool {
        let online = self.http.get(HEALTH_PATH, QueryParams::new()).await.is_ok();
        let was_online = self.online.swap(online, Ordering::Relaxed);
        if was_online != online {
            info!(online, "backend connectivity changed");
        }
        online
    }

    /// Result of the last probe (optimistic before the first one)
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}
