// src/store/mod.rs

//! Repository boundary. The engine only ever talks to [`Repository`];
//! `postgres` is the production backend, `memory` backs tests and
//! database-less local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    ActionKind, AssignmentRecord, CacheEntry, CacheKind, Employee, MonthKey, Schedule,
    StoredSchedule, Team, UsageRecord, ValidationLogEntry, ViolationRecord,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Insert payloads: ids and timestamps are assigned by the backend.

#[derive(Debug, Clone)]
pub struct NewAssignmentRecord {
    pub employee_id: i64,
    pub team_id: i64,
    pub month: MonthKey,
    pub shift_assigned: Option<String>,
    pub was_floater: bool,
    pub floater_for_shift: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewValidationLog {
    pub team_id: i64,
    pub result: serde_json::Value,
    pub violations_found: i32,
    pub is_valid: bool,
}

#[derive(Debug, Clone)]
pub struct NewViolationRecord {
    pub team_id: i64,
    pub rule_number: i32,
    pub detail: String,
    pub employee_affected: Option<String>,
    pub month: Option<MonthKey>,
}

#[derive(Debug, Clone)]
pub struct NewUsageRecord {
    pub user_id: i64,
    pub team_id: Option<i64>,
    pub action: ActionKind,
    pub tokens_used: i32,
    pub cost_estimate: f64,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct NewCacheEntry {
    pub cache_key: String,
    pub cache_type: CacheKind,
    pub cached_data: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait Repository: Send + Sync {
    // ── org views (read-only) ──────────────────────────────────────
    async fn team(&self, team_id: i64) -> Result<Option<Team>, StoreError>;
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;
    /// Active members of a team, most senior (lowest hierarchy level) first.
    async fn active_roster(&self, team_id: i64) -> Result<Vec<Employee>, StoreError>;

    // ── assignment history ─────────────────────────────────────────
    /// Newest-first history for (employee, team), capped at `limit`.
    async fn load_history(
        &self,
        employee_id: i64,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<AssignmentRecord>, StoreError>;
    /// Keyed by (employee, team, month): re-committing a month overwrites.
    async fn upsert_history(&self, record: NewAssignmentRecord) -> Result<(), StoreError>;

    // ── stored schedules ───────────────────────────────────────────
    async fn load_schedule(&self, team_id: i64) -> Result<Option<StoredSchedule>, StoreError>;
    async fn save_schedule(&self, team_id: i64, schedule: &Schedule) -> Result<(), StoreError>;
    async fn delete_schedule(&self, team_id: i64) -> Result<bool, StoreError>;
    /// Drop validation logs and violation records for a team (schedule teardown).
    async fn clear_validation_artifacts(&self, team_id: i64) -> Result<(), StoreError>;

    // ── validation artifacts ───────────────────────────────────────
    async fn log_validation(&self, entry: NewValidationLog) -> Result<(), StoreError>;
    async fn record_violation(&self, violation: NewViolationRecord) -> Result<(), StoreError>;
    async fn recent_validation_logs(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<ValidationLogEntry>, StoreError>;
    async fn recent_violations(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<ViolationRecord>, StoreError>;

    // ── usage ledger (append-only) ─────────────────────────────────
    async fn log_usage(&self, record: NewUsageRecord) -> Result<(), StoreError>;
    async fn count_usage_since(
        &self,
        user_id: i64,
        action: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
    async fn sum_cost_since(&self, user_id: i64, since: DateTime<Utc>)
        -> Result<f64, StoreError>;
    async fn usage_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>, StoreError>;
    async fn recent_team_usage(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError>;

    // ── memo cache ─────────────────────────────────────────────────
    /// All entries for a key, newest first. Overlapping entries accumulate;
    /// validity filtering happens in the cache layer.
    async fn load_cache_entries(&self, cache_key: &str) -> Result<Vec<CacheEntry>, StoreError>;
    async fn save_cache_entry(&self, entry: NewCacheEntry) -> Result<(), StoreError>;
    /// Observability only; never affects eviction.
    async fn bump_cache_hit(&self, cache_entry_id: i64) -> Result<(), StoreError>;
}
