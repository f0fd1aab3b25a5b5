use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TABLE_COUNT: u32 = 7;
pub const DEFAULT_TOLERANCE_MINUTES: i64 = 2;
pub const DAY_FORMAT: &str = "%Y-%m-%d";

const TABLE_KEY_PREFIX: &str = "table_";

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUsage {
    /// Accumulated seconds of use.
    pub total_time: u64,
}

/// One calendar day of table usage, keyed by `table_<n>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: String,
    pub tables: BTreeMap<String, TableUsage>,
}

impl UsageRecord {
    pub fn total_time(&self, table: u32) -> Option<u64> {
        self.tables
            .get(&table_key(table))
            .map(|usage| usage.total_time)
    }
}

/// A finished session as reported by a table client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub table_num: i64,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
}

/// Which calendar day a session is booked under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordDay {
    /// The server's local date at the moment of the write.
    #[default]
    ServerClock,
    /// The local date on which the session started.
    SessionStart,
}

impl RecordDay {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "server_clock" => Some(Self::ServerClock),
            "session_start" => Some(Self::SessionStart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub table_count: u32,
    pub tolerance_minutes: i64,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            table_count: DEFAULT_TABLE_COUNT,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
        }
    }
}

/// A report that passed range, format and reconciliation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedSession {
    pub table: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub claimed_minutes: i64,
    pub actual_minutes: i64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("table id out of range: {table} (expected 1..={max})")]
    TableOutOfRange { table: i64, max: u32 },
    #[error("unparseable timestamp for {field}: {value:?}")]
    UnparseableTimestamp { field: &'static str, value: String },
    #[error("invalid duration: {0} minutes")]
    NonPositiveDuration(i64),
    #[error("end time {end} precedes start time {start}")]
    EndBeforeStart { start: String, end: String },
    #[error(
        "duration mismatch: reported {claimed} min, calculated {actual} min (tolerance {tolerance} min)"
    )]
    DurationMismatch {
        claimed: i64,
        actual: i64,
        tolerance: i64,
    },
}

impl SessionError {
    /// True for errors caused by a reported duration that disagrees with its timestamps.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            SessionError::EndBeforeStart { .. } | SessionError::DurationMismatch { .. }
        )
    }
}

/// Source of the current local date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn table_key(table: u32) -> String {
    format!("{TABLE_KEY_PREFIX}{table}")
}

pub fn parse_table_key(key: &str) -> Option<u32> {
    let id = key.strip_prefix(TABLE_KEY_PREFIX)?.parse::<u32>().ok()?;
    (id > 0).then_some(id)
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Parses a client timestamp as local wall time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Local).naive_local())
}

/// Whole minutes between two timestamps, truncated toward zero.
pub fn elapsed_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds() / 60
}

pub fn validate_session(
    report: &SessionReport,
    limits: &SessionLimits,
) -> Result<ValidatedSession, SessionError> {
    let table = u32::try_from(report.table_num)
        .ok()
        .filter(|table| (1..=limits.table_count).contains(table))
        .ok_or(SessionError::TableOutOfRange {
            table: report.table_num,
            max: limits.table_count,
        })?;

    let start = parse_timestamp(&report.start_time).ok_or_else(|| {
        SessionError::UnparseableTimestamp {
            field: "start_time",
            value: report.start_time.clone(),
        }
    })?;
    let end = parse_timestamp(&report.end_time).ok_or_else(|| {
        SessionError::UnparseableTimestamp {
            field: "end_time",
            value: report.end_time.clone(),
        }
    })?;

    let duration_seconds = report
        .duration_minutes
        .checked_mul(60)
        .and_then(|seconds| u64::try_from(seconds).ok())
        .filter(|seconds| *seconds > 0)
        .ok_or(SessionError::NonPositiveDuration(report.duration_minutes))?;

    if end < start {
        return Err(SessionError::EndBeforeStart {
            start: report.start_time.trim().to_string(),
            end: report.end_time.trim().to_string(),
        });
    }

    let actual_minutes = elapsed_minutes(start, end);
    if (actual_minutes - report.duration_minutes).abs() > limits.tolerance_minutes {
        return Err(SessionError::DurationMismatch {
            claimed: report.duration_minutes,
            actual: actual_minutes,
            tolerance: limits.tolerance_minutes,
        });
    }

    Ok(ValidatedSession {
        table,
        start,
        end,
        claimed_minutes: report.duration_minutes,
        actual_minutes,
        duration_seconds,
    })
}

/// Picks the ledger day a validated session is booked under.
pub fn resolve_record_day(
    policy: RecordDay,
    session: &ValidatedSession,
    clock: &dyn Clock,
) -> String {
    match policy {
        RecordDay::ServerClock => format_day(clock.today()),
        RecordDay::SessionStart => format_day(session.start.date()),
    }
}
