use ledger_core::SessionReport;
use serde::Deserialize;

/// Body of `POST /update_stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatsRequest {
    pub table_num: i64,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
}

impl From<UpdateStatsRequest> for SessionReport {
    fn from(req: UpdateStatsRequest) -> Self {
        SessionReport {
            table_num: req.table_num,
            start_time: req.start_time,
            end_time: req.end_time,
            duration_minutes: req.duration_minutes,
        }
    }
}
