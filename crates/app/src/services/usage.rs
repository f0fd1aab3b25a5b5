use std::sync::Arc;

use ledger_core::{
    Clock, SessionReport, UsageRecord, resolve_record_day, table_key, validate_session,
};
use ledger_db::IncrementOutcome;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, SharedStore};

/// Acknowledges which ledger counter a session was added to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAck {
    pub date: String,
    pub table: u32,
    pub seconds_added: u64,
    pub outcome: IncrementOutcome,
}

impl RecordAck {
    pub fn message(&self) -> String {
        format!(
            "Updated {} with {} seconds",
            table_key(self.table),
            self.seconds_added
        )
    }
}

#[derive(Clone)]
pub struct UsageService {
    config: SharedConfig,
    store: SharedStore,
    clock: Arc<dyn Clock>,
}

impl UsageService {
    pub(super) fn new(config: SharedConfig, store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    /// Validates a session report and adds its duration to the ledger.
    ///
    /// Nothing touches storage unless validation passes. Storage writes are
    /// at-least-once: a `StorageUnavailable` error does not prove the write
    /// was skipped.
    pub fn record_session(&self, report: &SessionReport) -> Result<RecordAck> {
        let session = validate_session(report, &self.config.limits()).map_err(|err| {
            warn!(
                table = report.table_num,
                start_time = %report.start_time,
                end_time = %report.end_time,
                duration_minutes = report.duration_minutes,
                error = %err,
                "rejected session report"
            );
            AppError::from(err)
        })?;

        let date = resolve_record_day(self.config.record_day, &session, self.clock.as_ref());
        let table = session.table;
        let seconds = session.duration_seconds;

        let outcome = self
            .config
            .retry
            .run("add_table_time", |attempt| {
                debug!(%date, table, seconds, attempt, "writing usage");
                self.store
                    .add_table_time(&date, table, seconds, self.config.table_count)
            })
            .inspect_err(|err| {
                error!(%date, table, seconds, error = %err, "failed to record session");
            })?;

        let message = match outcome {
            IncrementOutcome::DayCreated => "created usage record for new day",
            IncrementOutcome::TableInitialized => "initialized table in existing record",
            IncrementOutcome::Incremented => "added seconds to existing table",
        };
        info!(%date, table, seconds, outcome = outcome.as_str(), "{message}");

        Ok(RecordAck {
            date,
            table,
            seconds_added: seconds,
            outcome,
        })
    }

    pub fn usage_record(&self, date: &str) -> Result<Option<UsageRecord>> {
        Ok(self.store.usage_record(date)?)
    }
}
