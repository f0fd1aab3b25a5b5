use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use app_api::UpdateStatsRequest;

use crate::{errors::HttpError, state::HttpState};

pub async fn update_stats(
    State(state): State<HttpState>,
    payload: Result<Json<UpdateStatsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(req) = payload?;
    let context = state.context.clone();
    let response =
        tokio::task::spawn_blocking(move || app_api::update_stats(&context, req)).await??;
    Ok(Json(response))
}

pub async fn health(State(state): State<HttpState>) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let response = tokio::task::spawn_blocking(move || app_api::health(&context)).await?;
    let status = if response.reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(response)))
}

pub async fn status() -> impl IntoResponse {
    Json(app_api::status())
}

pub async fn not_found() -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        "not found",
        Some("not_found".to_string()),
    )
}
