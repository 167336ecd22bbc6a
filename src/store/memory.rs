// src/store/memory.rs

//! In-memory repository. Backs the test suite and local runs without a
//! `DATABASE_URL`; state lives for the process lifetime only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    NewAssignmentRecord, NewCacheEntry, NewUsageRecord, NewValidationLog, NewViolationRecord,
    Repository, StoreError,
};
use crate::models::{
    ActionKind, AssignmentRecord, CacheEntry, Employee, Schedule, StoredSchedule, Team,
    UsageRecord, ValidationLogEntry, ViolationRecord,
};

#[derive(Default)]
struct Inner {
    teams: Vec<Team>,
    employees: Vec<Employee>,
    memberships: Vec<(i64, i64)>, // (team_id, employee_id)
    history: Vec<AssignmentRecord>,
    schedules: Vec<StoredSchedule>,
    validation_logs: Vec<ValidationLogEntry>,
    violations: Vec<ViolationRecord>,
    usage: Vec<UsageRecord>,
    cache: Vec<CacheEntry>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers; the production backend gets this data from the
    // organization-management side of the database.

    pub async fn add_team(&self, name: &str, shift_template: &str, people_per_shift: i32) -> i64 {
        let mut inner = self.inner.write().await;
        let team_id = inner.next_id();
        inner.teams.push(Team {
            team_id,
            name: name.to_string(),
            shift_template: shift_template.to_string(),
            people_per_shift,
        });
        team_id
    }

    pub async fn add_employee(
        &self,
        team_id: i64,
        full_name: &str,
        designation_title: &str,
        hierarchy_level: i32,
    ) -> i64 {
        let mut inner = self.inner.write().await;
        let employee_id = inner.next_id();
        inner.employees.push(Employee {
            employee_id,
            full_name: full_name.to_string(),
            gender: None,
            designation_title: designation_title.to_string(),
            hierarchy_level,
            monthly_leave_allowance: 2,
            is_active: true,
        });
        inner.memberships.push((team_id, employee_id));
        employee_id
    }

    pub async fn deactivate_employee(&self, employee_id: i64) {
        let mut inner = self.inner.write().await;
        if let Some(e) = inner.employees.iter_mut().find(|e| e.employee_id == employee_id) {
            e.is_active = false;
        }
    }

    /// Test hook: append a usage row with an explicit timestamp so window
    /// boundaries can be exercised without waiting out the window.
    pub async fn log_usage_at(&self, record: NewUsageRecord, timestamp: DateTime<Utc>) {
        let mut inner = self.inner.write().await;
        let usage_id = inner.next_id();
        inner.usage.push(UsageRecord {
            usage_id,
            user_id: record.user_id,
            team_id: record.team_id,
            action: record.action.as_str().to_string(),
            tokens_used: record.tokens_used,
            cost_estimate: record.cost_estimate,
            timestamp,
            success: record.success,
        });
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn team(&self, team_id: i64) -> Result<Option<Team>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.teams.iter().find(|t| t.team_id == team_id).cloned())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.inner.read().await.teams.clone())
    }

    async fn active_roster(&self, team_id: i64) -> Result<Vec<Employee>, StoreError> {
        let inner = self.inner.read().await;
        let member_ids: Vec<i64> = inner
            .memberships
            .iter()
            .filter(|(t, _)| *t == team_id)
            .map(|(_, e)| *e)
            .collect();
        let mut roster: Vec<Employee> = inner
            .employees
            .iter()
            .filter(|e| e.is_active && member_ids.contains(&e.employee_id))
            .cloned()
            .collect();
        roster.sort_by_key(|e| (e.hierarchy_level, e.employee_id));
        Ok(roster)
    }

    async fn load_history(
        &self,
        employee_id: i64,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<AssignmentRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut records: Vec<AssignmentRecord> = inner
            .history
            .iter()
            .filter(|h| h.employee_id == employee_id && h.team_id == team_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.month.cmp(&a.month));
        records.truncate(limit);
        Ok(records)
    }

    async fn upsert_history(&self, r: NewAssignmentRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let month = r.month.storage();
        if let Some(existing) = inner.history.iter_mut().find(|h| {
            h.employee_id == r.employee_id && h.team_id == r.team_id && h.month == month
        }) {
            existing.shift_assigned = r.shift_assigned;
            existing.was_floater = r.was_floater;
            existing.floater_for_shift = r.floater_for_shift;
        } else {
            inner.history.push(AssignmentRecord {
                employee_id: r.employee_id,
                team_id: r.team_id,
                month,
                shift_assigned: r.shift_assigned,
                was_floater: r.was_floater,
                floater_for_shift: r.floater_for_shift,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn load_schedule(&self, team_id: i64) -> Result<Option<StoredSchedule>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.schedules.iter().find(|s| s.team_id == team_id).cloned())
    }

    async fn save_schedule(&self, team_id: i64, schedule: &Schedule) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.schedules.retain(|s| s.team_id != team_id);
        inner.schedules.push(StoredSchedule {
            team_id,
            schedule: schedule.clone(),
            generated_on: Utc::now(),
        });
        Ok(())
    }

    async fn delete_schedule(&self, team_id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.schedules.len();
        inner.schedules.retain(|s| s.team_id != team_id);
        Ok(inner.schedules.len() < before)
    }

    async fn clear_validation_artifacts(&self, team_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.validation_logs.retain(|l| l.team_id != team_id);
        inner.violations.retain(|v| v.team_id != team_id);
        Ok(())
    }

    async fn log_validation(&self, e: NewValidationLog) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let validation_log_id = inner.next_id();
        inner.validation_logs.push(ValidationLogEntry {
            validation_log_id,
            team_id: e.team_id,
            result: e.result,
            violations_found: e.violations_found,
            is_valid: e.is_valid,
            validated_at: Utc::now(),
        });
        Ok(())
    }

    async fn record_violation(&self, v: NewViolationRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let violation_id = inner.next_id();
        inner.violations.push(ViolationRecord {
            violation_id,
            team_id: v.team_id,
            rule_number: v.rule_number,
            detail: v.detail,
            employee_affected: v.employee_affected,
            month: v.month.map(|m| m.storage()),
            resolved: false,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_validation_logs(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<ValidationLogEntry>, StoreError> {
        let inner = self.inner.read().await;
        let mut logs: Vec<ValidationLogEntry> = inner
            .validation_logs
            .iter()
            .filter(|l| l.team_id == team_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.validated_at.cmp(&a.validated_at));
        logs.truncate(limit);
        Ok(logs)
    }

    async fn recent_violations(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<ViolationRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ViolationRecord> = inner
            .violations
            .iter()
            .filter(|v| v.team_id == team_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn log_usage(&self, r: NewUsageRecord) -> Result<(), StoreError> {
        self.log_usage_at(r, Utc::now()).await;
        Ok(())
    }

    async fn count_usage_since(
        &self,
        user_id: i64,
        action: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .usage
            .iter()
            .filter(|u| u.user_id == user_id && u.action == action.as_str() && u.timestamp >= since)
            .count() as i64)
    }

    async fn sum_cost_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<f64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .usage
            .iter()
            .filter(|u| u.user_id == user_id && u.timestamp >= since)
            .map(|u| u.cost_estimate)
            .sum())
    }

    async fn usage_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<UsageRecord> = inner
            .usage
            .iter()
            .filter(|u| u.user_id == user_id && u.timestamp >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn recent_team_usage(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<UsageRecord> = inner
            .usage
            .iter()
            .filter(|u| u.team_id == Some(team_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn load_cache_entries(&self, cache_key: &str) -> Result<Vec<CacheEntry>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<CacheEntry> = inner
            .cache
            .iter()
            .filter(|c| c.cache_key == cache_key)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn save_cache_entry(&self, e: NewCacheEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let cache_entry_id = inner.next_id();
        inner.cache.push(CacheEntry {
            cache_entry_id,
            cache_key: e.cache_key,
            cache_type: e.cache_type.as_str().to_string(),
            cached_data: e.cached_data,
            created_at: Utc::now(),
            expires_at: e.expires_at,
            hit_count: 0,
        });
        Ok(())
    }

    async fn bump_cache_hit(&self, cache_entry_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.cache.iter_mut().find(|c| c.cache_entry_id == cache_entry_id) {
            entry.hit_count += 1;
        }
        Ok(())
    }
}
