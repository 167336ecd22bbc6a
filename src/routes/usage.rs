// src/routes/usage.rs

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::internal_error;
use crate::engine::governor::{day_start, month_start};
use crate::models::{UsageRecord, ValidationLogEntry, ViolationRecord};
use crate::store::Repository;
use crate::AppState;

#[derive(Serialize, Default)]
pub struct KindSummary {
    pub calls: usize,
    pub cost: f64,
    pub tokens: i64,
}

#[derive(Serialize)]
pub struct PeriodSummary {
    pub total_calls: usize,
    pub total_cost: f64,
    pub total_tokens: i64,
    pub by_type: HashMap<String, KindSummary>,
}

fn summarize(rows: &[UsageRecord]) -> PeriodSummary {
    let mut by_type: HashMap<String, KindSummary> = HashMap::new();
    for u in rows {
        let entry = by_type.entry(u.action.clone()).or_default();
        entry.calls += 1;
        entry.cost += u.cost_estimate;
        entry.tokens += u.tokens_used as i64;
    }
    PeriodSummary {
        total_calls: rows.len(),
        total_cost: rows.iter().map(|u| u.cost_estimate).sum(),
        total_tokens: rows.iter().map(|u| u.tokens_used as i64).sum(),
        by_type,
    }
}

#[derive(Serialize)]
pub struct UsageReport {
    pub today: PeriodSummary,
    pub week: PeriodSummary,
    pub month: PeriodSummary,
    pub daily_limit: f64,
    pub monthly_limit: f64,
}

/// GET /api/v1/usage/:user_id
pub async fn usage_report(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UsageReport>, (StatusCode, String)> {
    let now = Utc::now();
    let repo = &state.core.repo;
    let today = repo.usage_since(user_id, day_start(now)).await.map_err(internal_error)?;
    let week = repo
        .usage_since(user_id, now - Duration::days(7))
        .await
        .map_err(internal_error)?;
    let month = repo
        .usage_since(user_id, month_start(now))
        .await
        .map_err(internal_error)?;

    Ok(Json(UsageReport {
        today: summarize(&today),
        week: summarize(&week),
        month: summarize(&month),
        daily_limit: state.core.config.daily_cost_limit,
        monthly_limit: state.core.config.monthly_cost_limit,
    }))
}

#[derive(Serialize)]
pub struct TeamAnalytics {
    pub team_id: i64,
    pub recent_violations: Vec<ViolationRecord>,
    pub recent_validation_logs: Vec<ValidationLogEntry>,
    pub recent_usage: Vec<UsageRecord>,
    pub total_violations: usize,
}

/// GET /api/v1/teams/:id/analytics
pub async fn team_analytics(
    State(state): State<AppState>,
    Path(team_id): Path<i64>,
) -> Result<Json<TeamAnalytics>, (StatusCode, String)> {
    let repo = &state.core.repo;
    let recent_violations = repo.recent_violations(team_id, 10).await.map_err(internal_error)?;
    let recent_validation_logs =
        repo.recent_validation_logs(team_id, 5).await.map_err(internal_error)?;
    let recent_usage = repo.recent_team_usage(team_id, 10).await.map_err(internal_error)?;

    Ok(Json(TeamAnalytics {
        team_id,
        total_violations: recent_violations.len(),
        recent_violations,
        recent_validation_logs,
        recent_usage,
    }))
}
