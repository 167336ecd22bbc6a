// src/engine/error.rs

use crate::store::StoreError;
use thiserror::Error;

/// Failure taxonomy for the scheduling core. Structural errors abort a
/// request outright; governance denials reject it before any expensive
/// work; oracle trouble only ever downgrades validation confidence.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(
        "team '{team}' needs at least {required} active members for {template} \
         with {per_shift} per shift, found {actual}"
    )]
    InsufficientStaff {
        team: String,
        template: String,
        per_shift: i32,
        required: usize,
        actual: usize,
    },

    #[error("unrecognized shift template '{0}'")]
    InvalidTemplate(String),

    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("cost limit exceeded: {0}")]
    CostLimitExceeded(String),

    #[error("advisory oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("schedule repair failed: {0}")]
    RepairFailed(String),

    #[error("team {0} not found")]
    TeamNotFound(i64),

    #[error("a schedule already exists for team {0}; delete it before regenerating")]
    ScheduleExists(i64),

    #[error("no stored schedule for team {0}")]
    ScheduleMissing(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ScheduleError {
    pub fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::InsufficientStaff { .. } | Self::InvalidTemplate(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::RateLimitExceeded(_) | Self::CostLimitExceeded(_) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::TeamNotFound(_) | Self::ScheduleMissing(_) => StatusCode::NOT_FOUND,
            Self::ScheduleExists(_) => StatusCode::CONFLICT,
            Self::OracleUnavailable(_) | Self::RepairFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
