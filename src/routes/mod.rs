// src/routes/mod.rs

use axum::http::StatusCode;

use crate::engine::ScheduleError;

pub mod health;
pub mod schedules;
pub mod teams;
pub mod usage;
pub mod validation;

// Common error mappers
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn reject(e: ScheduleError) -> (StatusCode, String) {
    (e.status(), e.to_string())
}
