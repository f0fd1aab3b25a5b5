/// What an increment did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    /// First write of the day; every configured table was seeded at zero.
    DayCreated,
    /// The day existed but had no row for this table yet.
    TableInitialized,
    /// Added to an existing counter.
    Incremented,
}

impl IncrementOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncrementOutcome::DayCreated => "day_created",
            IncrementOutcome::TableInitialized => "table_initialized",
            IncrementOutcome::Incremented => "incremented",
        }
    }
}
