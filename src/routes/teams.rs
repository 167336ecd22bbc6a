// src/routes/teams.rs

// Read-only organization views. Team and employee management belongs to
// the org-management service; the scheduler only needs to see rosters.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{internal_error, reject};
use crate::engine::ScheduleError;
use crate::models::{Employee, Team};
use crate::store::Repository;
use crate::AppState;

#[derive(Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub active_roster: Vec<Employee>,
}

/// GET /api/v1/teams
pub async fn list_teams(
    State(state): State<AppState>,
) -> Result<Json<Vec<Team>>, (StatusCode, String)> {
    let teams = state.core.repo.list_teams().await.map_err(internal_error)?;
    Ok(Json(teams))
}

/// GET /api/v1/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TeamDetail>, (StatusCode, String)> {
    let team = state
        .core
        .repo
        .team(id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| reject(ScheduleError::TeamNotFound(id)))?;
    let active_roster = state.core.repo.active_roster(id).await.map_err(internal_error)?;
    Ok(Json(TeamDetail { team, active_roster }))
}
