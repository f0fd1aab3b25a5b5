use rusqlite::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("malformed stored data: {0}")]
    Corrupt(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("connection checkout failed: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("connection pool is closed")]
    PoolClosed,
}

impl DbError {
    /// Failures that may clear up if the same operation is attempted again.
    pub fn is_transient(&self) -> bool {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
            ),
            DbError::Pool(_) => true,
            _ => false,
        }
    }

    /// Failures caused by stored data that does not have the expected shape.
    pub fn is_corruption(&self) -> bool {
        match self {
            DbError::Corrupt(_) => true,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase
            ),
            DbError::Sqlite(
                rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..),
            ) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
