use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ledger_core::{
    Clock, DEFAULT_TABLE_COUNT, DEFAULT_TOLERANCE_MINUTES, RecordDay, SessionLimits, SystemClock,
};
use ledger_db::{DEFAULT_BUSY_TIMEOUT, DbPool};
use tracing::info;

use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::services::AppServices;
use crate::startup::ensure_db_parent_dir;
use crate::store::UsageStore;

const DEFAULT_POOL_SIZE: u32 = 8;

/// Settings for the ledger service.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub table_count: u32,
    pub tolerance_minutes: i64,
    pub record_day: RecordDay,
    pub retry: RetryPolicy,
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

impl AppConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            table_count: DEFAULT_TABLE_COUNT,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            record_day: RecordDay::default(),
            retry: RetryPolicy::default(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn limits(&self) -> SessionLimits {
        SessionLimits {
            table_count: self.table_count,
            tolerance_minutes: self.tolerance_minutes,
        }
    }
}

/// Application state shared by request handlers.
///
/// Owns the process-wide store handle; call [`AppState::shutdown`] once when
/// the process stops serving.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
    store: Arc<dyn UsageStore>,
}

impl AppState {
    /// Opens and migrates the SQLite ledger at `config.db_path`.
    pub fn open(config: AppConfig) -> Result<Self> {
        ensure_db_parent_dir(&config.db_path)?;
        let pool = DbPool::open(&config.db_path, config.pool_size, config.busy_timeout)?;
        info!(
            db_path = %config.db_path.display(),
            tables = config.table_count,
            "opened usage ledger"
        );
        Ok(Self::with_store(config, Arc::new(pool), Arc::new(SystemClock)))
    }

    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn UsageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let config = Arc::new(config);
        let services = AppServices::new(config.clone(), store.clone(), clock);
        Self {
            config,
            services,
            store,
        }
    }

    /// Drops the connection pool; later storage calls report the store as unavailable.
    pub fn shutdown(&self) {
        self.store.close();
        info!("closed usage ledger");
    }
}
