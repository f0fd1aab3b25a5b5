#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use ledger_app::{AppConfig, AppState, RetryPolicy, UsageStore};
use ledger_core::{FixedClock, SessionReport, UsageRecord};
use ledger_db::{DbError, DbPool, IncrementOutcome};
use tempfile::TempDir;

pub const TODAY: &str = "2024-01-01";

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

pub fn test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::new(dir.path().join("ledger.sqlite"));
    config.retry = RetryPolicy::new(3, Duration::ZERO);
    config
}

pub fn open_pool(config: &AppConfig) -> DbPool {
    DbPool::open(&config.db_path, config.pool_size, config.busy_timeout).expect("open pool")
}

pub fn setup_app() -> TestApp {
    setup_app_with(|_| {})
}

pub fn setup_app_with(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = test_config(&dir);
    configure(&mut config);
    let pool = open_pool(&config);
    let state = AppState::with_store(config, Arc::new(pool), Arc::new(FixedClock(today())));
    TestApp { _dir: dir, state }
}

pub fn report(table: i64, start: &str, end: &str, minutes: i64) -> SessionReport {
    SessionReport {
        table_num: table,
        start_time: start.to_string(),
        end_time: end.to_string(),
        duration_minutes: minutes,
    }
}

pub fn busy_error() -> DbError {
    DbError::Sqlite(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        Some("database is locked".to_string()),
    ))
}

#[derive(Clone, Copy, Debug)]
pub enum Fault {
    Busy,
    Corrupt,
}

/// Fails the first `failures` writes with `fault`, then delegates to SQLite.
pub struct FlakyStore {
    inner: DbPool,
    fault: Fault,
    failures_left: AtomicU32,
    write_calls: AtomicU32,
}

impl FlakyStore {
    pub fn new(inner: DbPool, fault: Fault, failures: u32) -> Self {
        Self {
            inner,
            fault,
            failures_left: AtomicU32::new(failures),
            write_calls: AtomicU32::new(0),
        }
    }

    pub fn write_calls(&self) -> u32 {
        self.write_calls.load(Ordering::SeqCst)
    }
}

impl UsageStore for FlakyStore {
    fn add_table_time(
        &self,
        date: &str,
        table: u32,
        seconds: u64,
        table_count: u32,
    ) -> ledger_db::Result<IncrementOutcome> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(match self.fault {
                Fault::Busy => busy_error(),
                Fault::Corrupt => DbError::Corrupt("table_1 total_time is not an integer".into()),
            });
        }
        self.inner
            .add_table_time(date, table, seconds, table_count)
    }

    fn usage_record(&self, date: &str) -> ledger_db::Result<Option<UsageRecord>> {
        self.inner.usage_record(date)
    }

    fn ping(&self) -> ledger_db::Result<()> {
        self.inner.ping()
    }

    fn close(&self) {
        self.inner.close();
    }
}

pub struct FlakyApp {
    pub _dir: TempDir,
    pub state: AppState,
    pub store: Arc<FlakyStore>,
}

pub fn setup_flaky_app(fault: Fault, failures: u32) -> FlakyApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(&dir);
    let store = Arc::new(FlakyStore::new(open_pool(&config), fault, failures));
    let state = AppState::with_store(config, store.clone(), Arc::new(FixedClock(today())));
    FlakyApp {
        _dir: dir,
        state,
        store,
    }
}
