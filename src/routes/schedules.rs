// src/routes/schedules.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{internal_error, reject};
use crate::engine::{GenerationOutcome, ScheduleError};
use crate::models::{Schedule, StoredSchedule};
use crate::store::Repository;
use crate::AppState;

#[derive(Deserialize)]
pub struct GenerateBody {
    pub user_id: i64,
    #[serde(default = "default_months")]
    pub months: u32,
}

fn default_months() -> u32 {
    1
}

/// POST /api/v1/teams/:id/schedule
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Json(b): Json<GenerateBody>,
) -> Result<Json<GenerationOutcome>, (StatusCode, String)> {
    let months = b.months.max(1);
    let outcome = state
        .core
        .generate_schedule(b.user_id, team_id, months)
        .await
        .map_err(reject)?;
    Ok(Json(outcome))
}

/// GET /api/v1/teams/:id/schedule
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<StoredSchedule>, (StatusCode, String)> {
    let stored = state
        .core
        .repo
        .load_schedule(team_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| reject(ScheduleError::ScheduleMissing(team_id)))?;
    Ok(Json(stored))
}

/// DELETE /api/v1/teams/:id/schedule
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let deleted = state.core.delete_schedule(team_id).await.map_err(reject)?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// POST /api/v1/teams/:id/schedule/emergency
pub async fn emergency_schedule(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<Schedule>, (StatusCode, String)> {
    let schedule = state.core.emergency_schedule(team_id).await.map_err(reject)?;
    Ok(Json(schedule))
}
