mod health;
mod usage;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::store::UsageStore;
use ledger_core::Clock;

pub use health::{HealthService, HealthStatus};
pub use usage::{RecordAck, UsageService};

type SharedConfig = Arc<AppConfig>;
type SharedStore = Arc<dyn UsageStore>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub usage: UsageService,
    pub health: HealthService,
}

impl AppServices {
    pub fn new(config: SharedConfig, store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            usage: UsageService::new(config, store.clone(), clock),
            health: HealthService::new(store),
        }
    }
}
