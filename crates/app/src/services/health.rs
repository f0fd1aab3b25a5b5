use serde::Serialize;
use tracing::warn;

use crate::services::SharedStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub reachable: bool,
}

#[derive(Clone)]
pub struct HealthService {
    store: SharedStore,
}

impl HealthService {
    pub(super) fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Single liveness probe against storage; never retried, never writes.
    pub fn check(&self) -> HealthStatus {
        match self.store.ping() {
            Ok(()) => HealthStatus { reachable: true },
            Err(err) => {
                warn!(error = %err, "storage health probe failed");
                HealthStatus { reachable: false }
            }
        }
    }
}
