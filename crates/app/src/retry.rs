use std::thread;
use std::time::Duration;

use ledger_db::DbError;
use tracing::{error, warn};

use crate::error::{AppError, Result};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay retry for storage calls that fail transiently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    ///
    /// Blocks the calling thread between attempts.
    pub fn run<T>(
        &self,
        operation: &str,
        mut op: impl FnMut(u32) -> std::result::Result<T, DbError>,
    ) -> Result<T> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_transient() {
                return Err(AppError::from(err));
            }
            if attempt >= max_attempts {
                error!(
                    operation,
                    attempts = attempt,
                    error = %err,
                    "storage still failing, giving up"
                );
                return Err(AppError::StorageUnavailable {
                    attempts: attempt,
                    reason: err.to_string(),
                });
            }
            warn!(
                operation,
                attempt,
                max_attempts,
                delay_ms = self.delay.as_millis() as u64,
                error = %err,
                "transient storage error, retrying"
            );
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            attempt += 1;
        }
    }
}
