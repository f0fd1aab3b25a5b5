use ledger_core::SessionError;
use ledger_db::DbError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    DurationMismatch(String),
    #[error("storage unavailable after {attempts} attempt(s): {reason}")]
    StorageUnavailable { attempts: u32, reason: String },
    #[error("storage corruption: {0}")]
    StorageCorruption(String),
    #[error("db error: {0}")]
    Db(DbError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        if err.is_corruption() {
            AppError::StorageCorruption(err.to_string())
        } else if err.is_transient() || matches!(err, DbError::PoolClosed) {
            AppError::StorageUnavailable {
                attempts: 1,
                reason: err.to_string(),
            }
        } else {
            AppError::Db(err)
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        if err.is_mismatch() {
            AppError::DurationMismatch(err.to_string())
        } else {
            AppError::InvalidInput(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::InvalidInput(_) => (400, Some("invalid_input".to_string())),
            AppError::DurationMismatch(_) => (400, Some("duration_mismatch".to_string())),
            AppError::StorageUnavailable { .. } => {
                (503, Some("storage_unavailable".to_string()))
            }
            AppError::StorageCorruption(_) => (500, Some("storage_corruption".to_string())),
            AppError::Db(_) | AppError::Io(_) => (500, None),
        };
        Self {
            status,
            detail: err.to_string(),
            code,
        }
    }
}
