use ledger_core::UsageRecord;
use ledger_db::{DbPool, IncrementOutcome, Result};

/// Storage operations the accumulator needs from the ledger backend.
pub trait UsageStore: Send + Sync {
    /// Atomically adds `seconds` to `table` on `date`, creating the day with
    /// tables `1..=table_count` at zero if it does not exist yet.
    fn add_table_time(
        &self,
        date: &str,
        table: u32,
        seconds: u64,
        table_count: u32,
    ) -> Result<IncrementOutcome>;

    fn usage_record(&self, date: &str) -> Result<Option<UsageRecord>>;

    fn ping(&self) -> Result<()>;

    fn close(&self) {}
}

impl UsageStore for DbPool {
    fn add_table_time(
        &self,
        date: &str,
        table: u32,
        seconds: u64,
        table_count: u32,
    ) -> Result<IncrementOutcome> {
        self.get()?
            .add_table_time(date, table, seconds, table_count)
    }

    fn usage_record(&self, date: &str) -> Result<Option<UsageRecord>> {
        self.get()?.usage_record(date)
    }

    fn ping(&self) -> Result<()> {
        self.get()?.ping()
    }

    fn close(&self) {
        DbPool::close(self);
    }
}
