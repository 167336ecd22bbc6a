// src/routes/validation.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::reject;
use crate::engine::{FixOutcome, ValidationOutcome};
use crate::AppState;

#[derive(Deserialize)]
pub struct ActorBody {
    pub user_id: i64,
}

/// POST /api/v1/teams/:id/validate
pub async fn validate_schedule(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Json(b): Json<ActorBody>,
) -> Result<Json<ValidationOutcome>, (StatusCode, String)> {
    let outcome = state
        .core
        .validate_schedule(b.user_id, team_id)
        .await
        .map_err(reject)?;
    Ok(Json(outcome))
}

/// POST /api/v1/teams/:id/fix
pub async fn fix_schedule(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
    Json(b): Json<ActorBody>,
) -> Result<Json<FixOutcome>, (StatusCode, String)> {
    let outcome = state.core.fix_schedule(b.user_id, team_id).await.map_err(reject)?;
    Ok(Json(outcome))
}
