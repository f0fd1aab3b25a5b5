pub mod app;
pub mod error;
pub mod retry;
pub mod services;
pub mod startup;
pub mod store;

pub use app::{AppConfig, AppState};
pub use error::{ApiError, AppError, Result};
pub use retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};
pub use services::{AppServices, HealthStatus, RecordAck, UsageService};
pub use startup::ensure_db_parent_dir;
pub use store::UsageStore;
