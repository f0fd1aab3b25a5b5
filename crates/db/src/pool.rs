use std::path::Path;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use r2d2::{ManageConnection, Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::{DbError, Result};
use crate::{Db, configure_connection};

/// Connection string for a private in-memory ledger.
pub const MEMORY_PATH: &str = ":memory:";

const MIN_CHECKOUT_TIMEOUT: Duration = Duration::from_millis(100);

pub type PooledDb = PooledConnection<DbManager>;

/// Opens configured [`Db`] connections for the pool.
pub struct DbManager {
    inner: SqliteConnectionManager,
}

impl DbManager {
    pub fn new(path: &Path, busy_timeout: Duration) -> Self {
        let inner = if is_memory(path) {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        };
        let inner = inner
            .with_init(move |conn: &mut Connection| configure_connection(conn, busy_timeout));
        Self { inner }
    }
}

impl ManageConnection for DbManager {
    type Connection = Db;
    type Error = rusqlite::Error;

    fn connect(&self) -> std::result::Result<Db, rusqlite::Error> {
        self.inner.connect().map(|conn| Db { conn })
    }

    fn is_valid(&self, db: &mut Db) -> std::result::Result<(), rusqlite::Error> {
        self.inner.is_valid(&mut db.conn)
    }

    fn has_broken(&self, db: &mut Db) -> bool {
        self.inner.has_broken(&mut db.conn)
    }
}

/// Process-wide pool of SQLite connections to one ledger database.
///
/// At most `max_size` connections are open at once; a checkout waits up to
/// the busy timeout for one to free up. An in-memory ledger lives in a single
/// connection, so its pool is capped at one.
pub struct DbPool {
    pool: RwLock<Option<Pool<DbManager>>>,
}

impl DbPool {
    /// Opens the database, applies migrations and starts the pool.
    pub fn open(path: impl AsRef<Path>, max_size: u32, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let manager = DbManager::new(path, busy_timeout);
        let builder = Pool::<DbManager>::builder()
            .connection_timeout(busy_timeout.max(MIN_CHECKOUT_TIMEOUT));

        let pool = if is_memory(path) {
            let pool = builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
                .build_unchecked(manager);
            let mut db = pool.get()?;
            db.migrate()?;
            drop(db);
            pool
        } else {
            // Open errors surface here instead of as a checkout timeout.
            manager.connect()?.migrate()?;
            builder.max_size(max_size.max(1)).build_unchecked(manager)
        };

        Ok(Self {
            pool: RwLock::new(Some(pool)),
        })
    }

    pub fn get(&self) -> Result<PooledDb> {
        Ok(self.handle()?.get()?)
    }

    /// Upper bound on simultaneously open connections, or `None` once closed.
    pub fn max_size(&self) -> Option<u32> {
        self.handle().ok().map(|pool| pool.max_size())
    }

    /// Open and idle connection counts, or `None` once closed.
    pub fn state(&self) -> Option<r2d2::State> {
        self.handle().ok().map(|pool| pool.state())
    }

    pub fn is_closed(&self) -> bool {
        self.handle().is_err()
    }

    /// Refuses further checkouts and drops the pool. Connections still
    /// checked out close when they are returned.
    pub fn close(&self) {
        self.pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn handle(&self) -> Result<Pool<DbManager>> {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(DbError::PoolClosed)
    }
}

fn is_memory(path: &Path) -> bool {
    path == Path::new(MEMORY_PATH)
}
