// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar, Pool, Postgres};

use super::{
    NewAssignmentRecord, NewCacheEntry, NewUsageRecord, NewValidationLog, NewViolationRecord,
    Repository, StoreError,
};
use crate::models::{
    ActionKind, AssignmentRecord, CacheEntry, Employee, Schedule, StoredSchedule, Team,
    UsageRecord, ValidationLogEntry, ViolationRecord,
};

#[derive(Clone)]
pub struct PgRepository {
    pool: Pool<Postgres>,
}

impl PgRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn team(&self, team_id: i64) -> Result<Option<Team>, StoreError> {
        let row = query_as::<_, Team>(
            r#"SELECT team_id, name, shift_template, people_per_shift
               FROM public.teams WHERE team_id=$1"#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let rows = query_as::<_, Team>(
            r#"SELECT team_id, name, shift_template, people_per_shift
               FROM public.teams ORDER BY team_id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn active_roster(&self, team_id: i64) -> Result<Vec<Employee>, StoreError> {
        let rows = query_as::<_, Employee>(
            r#"
            SELECT e.employee_id, e.full_name, e.gender, e.is_active,
                   d.title AS designation_title, d.hierarchy_level, d.monthly_leave_allowance
              FROM public.employees e
              JOIN public.designations d ON d.designation_id = e.designation_id
              JOIN public.team_members tm ON tm.employee_id = e.employee_id
             WHERE tm.team_id = $1 AND e.is_active
             ORDER BY d.hierarchy_level, e.employee_id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn load_history(
        &self,
        employee_id: i64,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<AssignmentRecord>, StoreError> {
        let rows = query_as::<_, AssignmentRecord>(
            r#"
            SELECT employee_id, team_id, month, shift_assigned, was_floater,
                   floater_for_shift, created_at
              FROM public.assignment_history
             WHERE employee_id=$1 AND team_id=$2
             ORDER BY month DESC
             LIMIT $3
            "#,
        )
        .bind(employee_id)
        .bind(team_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_history(&self, r: NewAssignmentRecord) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.assignment_history
                (employee_id, team_id, month, shift_assigned, was_floater, floater_for_shift, created_at)
            VALUES ($1,$2,$3,$4,$5,$6, now())
            ON CONFLICT (employee_id, team_id, month) DO UPDATE
               SET shift_assigned    = EXCLUDED.shift_assigned,
                   was_floater       = EXCLUDED.was_floater,
                   floater_for_shift = EXCLUDED.floater_for_shift
            "#,
        )
        .bind(r.employee_id)
        .bind(r.team_id)
        .bind(r.month.storage())
        .bind(&r.shift_assigned)
        .bind(r.was_floater)
        .bind(&r.floater_for_shift)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_schedule(&self, team_id: i64) -> Result<Option<StoredSchedule>, StoreError> {
        let row = query_as::<_, (serde_json::Value, DateTime<Utc>)>(
            r#"SELECT schedule_data, generated_on
               FROM public.saved_schedules WHERE team_id=$1"#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((data, generated_on)) => {
                let schedule: Schedule = serde_json::from_value(data)?;
                Ok(Some(StoredSchedule { team_id, schedule, generated_on }))
            }
            None => Ok(None),
        }
    }

    async fn save_schedule(&self, team_id: i64, schedule: &Schedule) -> Result<(), StoreError> {
        let data = serde_json::to_value(schedule)?;
        query(
            r#"
            INSERT INTO public.saved_schedules (team_id, schedule_data, generated_on)
            VALUES ($1,$2, now())
            ON CONFLICT (team_id) DO UPDATE
               SET schedule_data = EXCLUDED.schedule_data,
                   generated_on  = now()
            "#,
        )
        .bind(team_id)
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_schedule(&self, team_id: i64) -> Result<bool, StoreError> {
        let res = query(r#"DELETE FROM public.saved_schedules WHERE team_id=$1"#)
            .bind(team_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn clear_validation_artifacts(&self, team_id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        query(r#"DELETE FROM public.validation_logs WHERE team_id=$1"#)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        query(r#"DELETE FROM public.rule_violations WHERE team_id=$1"#)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn log_validation(&self, e: NewValidationLog) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.validation_logs
                (team_id, result, violations_found, is_valid, validated_at)
            VALUES ($1,$2,$3,$4, now())
            "#,
        )
        .bind(e.team_id)
        .bind(e.result)
        .bind(e.violations_found)
        .bind(e.is_valid)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_violation(&self, v: NewViolationRecord) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.rule_violations
                (team_id, rule_number, detail, employee_affected, month, resolved, created_at)
            VALUES ($1,$2,$3,$4,$5, false, now())
            "#,
        )
        .bind(v.team_id)
        .bind(v.rule_number)
        .bind(&v.detail)
        .bind(&v.employee_affected)
        .bind(v.month.map(|m| m.storage()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_validation_logs(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<ValidationLogEntry>, StoreError> {
        let rows = query_as::<_, ValidationLogEntry>(
            r#"
            SELECT validation_log_id, team_id, result, violations_found, is_valid, validated_at
              FROM public.validation_logs
             WHERE team_id=$1 ORDER BY validated_at DESC LIMIT $2
            "#,
        )
        .bind(team_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_violations(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<ViolationRecord>, StoreError> {
        let rows = query_as::<_, ViolationRecord>(
            r#"
            SELECT violation_id, team_id, rule_number, detail, employee_affected,
                   month, resolved, created_at
              FROM public.rule_violations
             WHERE team_id=$1 ORDER BY created_at DESC LIMIT $2
            "#,
        )
        .bind(team_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn log_usage(&self, r: NewUsageRecord) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.usage_logs
                (user_id, team_id, action, tokens_used, cost_estimate, timestamp, success)
            VALUES ($1,$2,$3,$4,$5, now(), $6)
            "#,
        )
        .bind(r.user_id)
        .bind(r.team_id)
        .bind(r.action.as_str())
        .bind(r.tokens_used)
        .bind(r.cost_estimate)
        .bind(r.success)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_usage_since(
        &self,
        user_id: i64,
        action: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let n: i64 = query_scalar(
            r#"SELECT COUNT(*) FROM public.usage_logs
               WHERE user_id=$1 AND action=$2 AND timestamp >= $3"#,
        )
        .bind(user_id)
        .bind(action.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    async fn sum_cost_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<f64, StoreError> {
        let total: Option<f64> = query_scalar(
            r#"SELECT SUM(cost_estimate) FROM public.usage_logs
               WHERE user_id=$1 AND timestamp >= $2"#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unwrap_or(0.0))
    }

    async fn usage_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let rows = query_as::<_, UsageRecord>(
            r#"
            SELECT usage_id, user_id, team_id, action, tokens_used, cost_estimate,
                   timestamp, success
              FROM public.usage_logs
             WHERE user_id=$1 AND timestamp >= $2
             ORDER BY timestamp DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_team_usage(
        &self,
        team_id: i64,
        limit: usize,
    ) -> Result<Vec<UsageRecord>, StoreError> {
        let rows = query_as::<_, UsageRecord>(
            r#"
            SELECT usage_id, user_id, team_id, action, tokens_used, cost_estimate,
                   timestamp, success
              FROM public.usage_logs
             WHERE team_id=$1 ORDER BY timestamp DESC LIMIT $2
            "#,
        )
        .bind(team_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn load_cache_entries(&self, cache_key: &str) -> Result<Vec<CacheEntry>, StoreError> {
        let rows = query_as::<_, CacheEntry>(
            r#"
            SELECT cache_entry_id, cache_key, cache_type, cached_data,
                   created_at, expires_at, hit_count
              FROM public.schedule_cache
             WHERE cache_key=$1 ORDER BY created_at DESC
            "#,
        )
        .bind(cache_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn save_cache_entry(&self, e: NewCacheEntry) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.schedule_cache
                (cache_key, cache_type, cached_data, created_at, expires_at, hit_count)
            VALUES ($1,$2,$3, now(), $4, 0)
            "#,
        )
        .bind(&e.cache_key)
        .bind(e.cache_type.as_str())
        .bind(e.cached_data)
        .bind(e.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn bump_cache_hit(&self, cache_entry_id: i64) -> Result<(), StoreError> {
        query(r#"UPDATE public.schedule_cache SET hit_count = hit_count + 1 WHERE cache_entry_id=$1"#)
            .bind(cache_entry_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
