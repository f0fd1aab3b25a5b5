#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use ledger_db::{Db, DbPool};
use tempfile::TempDir;

pub const TABLE_COUNT: u32 = 7;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub struct TestPool {
    pub _dir: TempDir,
    pub pool: DbPool,
}

pub fn setup_pool(max_size: u32) -> TestPool {
    setup_pool_with_timeout(max_size, Duration::from_secs(10))
}

pub fn setup_pool_with_timeout(max_size: u32, checkout_timeout: Duration) -> TestPool {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pool.sqlite");
    let pool = DbPool::open(&path, max_size, checkout_timeout).expect("open pool");
    TestPool { _dir: dir, pool }
}
