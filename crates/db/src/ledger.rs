use std::collections::BTreeMap;

use chrono::Utc;
use ledger_core::{TableUsage, UsageRecord, parse_table_key, table_key};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use crate::Db;
use crate::error::{DbError, Result};
use crate::types::IncrementOutcome;

impl Db {
    /// Adds `seconds` to one table's counter for `date`, creating the day on
    /// first use with tables `1..=table_count` seeded at zero.
    ///
    /// Runs as a single immediate transaction, so concurrent writers for the
    /// same day serialize on SQLite's write lock instead of losing updates.
    pub fn add_table_time(
        &mut self,
        date: &str,
        table: u32,
        seconds: u64,
        table_count: u32,
    ) -> Result<IncrementOutcome> {
        let seconds = i64::try_from(seconds)
            .map_err(|_| DbError::InvalidValue(format!("{seconds} seconds does not fit")))?;
        let key = table_key(table);
        let now = Utc::now().to_rfc3339();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let day_created = tx.execute(
            "INSERT OR IGNORE INTO usage_day (date, created_at) VALUES (?1, ?2)",
            params![date, now],
        )? > 0;
        if day_created {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO table_usage (date, table_key, total_time, updated_at)
                VALUES (?1, ?2, 0, ?3)
                "#,
            )?;
            for id in 1..=table_count {
                stmt.execute(params![date, table_key(id), now])?;
            }
        }

        let existing: Option<i64> = tx
            .query_row(
                "SELECT total_time FROM table_usage WHERE date = ?1 AND table_key = ?2",
                params![date, key],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(total) = existing
            && total < 0
        {
            return Err(DbError::Corrupt(format!(
                "{key} on {date} has negative total_time {total}"
            )));
        }

        tx.execute(
            r#"
            INSERT INTO table_usage (date, table_key, total_time, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(date, table_key) DO UPDATE SET
              total_time = total_time + excluded.total_time,
              updated_at = excluded.updated_at
            "#,
            params![date, key, seconds, now],
        )?;
        tx.commit()?;

        let outcome = if day_created {
            IncrementOutcome::DayCreated
        } else if existing.is_none() {
            IncrementOutcome::TableInitialized
        } else {
            IncrementOutcome::Incremented
        };
        Ok(outcome)
    }

    pub fn usage_record(&self, date: &str) -> Result<Option<UsageRecord>> {
        let day: Option<String> = self
            .conn
            .query_row(
                "SELECT date FROM usage_day WHERE date = ?1",
                params![date],
                |row| row.get(0),
            )
            .optional()?;
        let Some(date) = day else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            r#"
            SELECT table_key, total_time
            FROM table_usage
            WHERE date = ?1
            "#,
        )?;
        let rows = stmt
            .query_map(params![date], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut tables = BTreeMap::new();
        for (key, total) in rows {
            if parse_table_key(&key).is_none() {
                return Err(DbError::Corrupt(format!(
                    "unexpected table key {key:?} on {date}"
                )));
            }
            let total_time = u64::try_from(total).map_err(|_| {
                DbError::Corrupt(format!("{key} on {date} has negative total_time {total}"))
            })?;
            tables.insert(key, TableUsage { total_time });
        }
        Ok(Some(UsageRecord { date, tables }))
    }

    pub fn list_usage_days(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM usage_day ORDER BY date ASC")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
