use ledger_app::Result;
use ledger_core::SessionReport;

use crate::{AppContext, HealthResponse, StatusResponse, UpdateStatsRequest, UpdateStatsResponse};

pub fn update_stats(ctx: &AppContext, req: UpdateStatsRequest) -> Result<UpdateStatsResponse> {
    let report = SessionReport::from(req);
    let ack = ctx.app_state.services.usage.record_session(&report)?;
    Ok(UpdateStatsResponse {
        status: "success",
        message: ack.message(),
    })
}

pub fn health(ctx: &AppContext) -> HealthResponse {
    let status = ctx.app_state.services.health.check();
    HealthResponse {
        reachable: status.reachable,
    }
}

pub fn status() -> StatusResponse {
    StatusResponse {
        status: "ok",
        message: "billiard ledger is running",
    }
}
