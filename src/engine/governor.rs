// src/engine/governor.rs

//! Usage governor: trailing-window rate ceilings per action kind and
//! calendar-window cost ceilings per user. Decisions are advisory — the
//! orchestrating layer enforces them before any expensive work runs.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::config::Config;
use crate::models::ActionKind;
use crate::store::{Repository, StoreError};

#[derive(Debug, Clone)]
pub struct RateDecision {
    pub allowed: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CostDecision {
    pub allowed: bool,
    /// Set when blocked.
    pub message: Option<String>,
    /// Soft warnings once usage crosses the warning fraction of a ceiling.
    pub warnings: Vec<String>,
}

/// Count the user's actions of this kind inside the trailing window.
/// Denies once the ceiling is reached (the limit-th call already used the
/// last slot).
pub async fn check_rate(
    repo: &dyn Repository,
    config: &Config,
    user_id: i64,
    action: ActionKind,
    now: DateTime<Utc>,
) -> Result<RateDecision, StoreError> {
    let limit = config.rate_limit(action);
    let window_start = now - Duration::seconds(limit.window_secs);
    let recent = repo.count_usage_since(user_id, action, window_start).await?;

    if recent >= limit.limit {
        return Ok(RateDecision {
            allowed: false,
            message: format!(
                "Rate limit exceeded. Maximum {} {} calls per hour.",
                limit.limit,
                action.as_str()
            ),
        });
    }
    Ok(RateDecision {
        allowed: true,
        message: format!(
            "{recent}/{} {} calls used in current window",
            limit.limit,
            action.as_str()
        ),
    })
}

pub(crate) fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

pub(crate) fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
        .and_utc()
}

/// Sum estimated spend for the current calendar day and month. Ceilings
/// are inclusive: hitting the limit exactly already blocks.
pub async fn check_cost(
    repo: &dyn Repository,
    config: &Config,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<CostDecision, StoreError> {
    let daily = repo.sum_cost_since(user_id, day_start(now)).await?;
    let monthly = repo.sum_cost_since(user_id, month_start(now)).await?;

    if daily >= config.daily_cost_limit {
        return Ok(CostDecision {
            allowed: false,
            message: Some(format!(
                "Daily cost limit exceeded (${daily:.2}/${:.2})",
                config.daily_cost_limit
            )),
            warnings: Vec::new(),
        });
    }
    if monthly >= config.monthly_cost_limit {
        return Ok(CostDecision {
            allowed: false,
            message: Some(format!(
                "Monthly cost limit exceeded (${monthly:.2}/${:.2})",
                config.monthly_cost_limit
            )),
            warnings: Vec::new(),
        });
    }

    let mut warnings = Vec::new();
    if daily >= config.daily_cost_limit * config.warning_fraction {
        warnings.push(format!(
            "Daily cost warning: ${daily:.2}/${:.2}",
            config.daily_cost_limit
        ));
    }
    if monthly >= config.monthly_cost_limit * config.warning_fraction {
        warnings.push(format!(
            "Monthly cost warning: ${monthly:.2}/${:.2}",
            config.monthly_cost_limit
        ));
    }

    Ok(CostDecision { allowed: true, message: None, warnings })
}
