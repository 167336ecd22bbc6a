// src/engine/mod.rs

//! Scheduling core: generation, state, validation, caching and usage
//! governance, orchestrated as Governor → Cache → Generator → Validator
//! → State Manager, short-circuiting at the first denial.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

pub mod cache;
pub mod error;
pub mod generator;
pub mod governor;
pub mod rules;
pub mod state;
pub mod validator;

pub use error::ScheduleError;

use crate::config::Config;
use crate::models::{ActionKind, CacheKind, MonthKey, Schedule, Team, ValidationReport};
use crate::oracle::{OracleClient, OracleFixRequest};
use crate::store::{NewUsageRecord, Repository};

/// Mutual exclusion keyed by request fingerprint: at most one in-flight
/// generation per team shape, while different teams run in parallel.
#[derive(Clone, Default)]
pub struct RunLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl RunLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            // Guards hold an Arc, so count 1 means nobody is using the
            // entry; dropping it here keeps the map bounded by concurrency,
            // not by every fingerprint ever seen.
            map.retain(|_, l| Arc::strong_count(l) > 1);
            map.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationOutcome {
    pub schedule: Schedule,
    pub report: Option<ValidationReport>,
    pub from_cache: bool,
    pub cost_warnings: Vec<String>,
    /// Set when the schedule was generated but history commit or cache
    /// store failed; the caller may retry those independently.
    pub post_processing_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    pub cost_warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixOutcome {
    /// Nothing to fix.
    AlreadyValid { report: ValidationReport },
    /// Correction accepted, persisted and committed to history.
    Fixed { report: ValidationReport },
    /// The oracle produced a correction that still violates rules; the
    /// original schedule is untouched.
    StillViolating { report: ValidationReport },
}

/// Everything the scheduling core needs, shared across requests.
#[derive(Clone)]
pub struct Core {
    pub repo: Arc<dyn Repository>,
    pub oracle: Option<OracleClient>,
    pub config: Config,
    pub locks: RunLocks,
}

impl Core {
    pub fn new(repo: Arc<dyn Repository>, config: Config) -> Result<Self, ScheduleError> {
        let oracle = match &config.oracle_url {
            Some(url) => Some(OracleClient::new(
                url.clone(),
                Duration::from_secs(config.oracle_timeout_secs),
            )?),
            None => None,
        };
        Ok(Self { repo, oracle, config, locks: RunLocks::new() })
    }

    /// Rate then cost gate; returns cost warnings on pass. Denial happens
    /// before any expensive work and consumes no quota.
    async fn governed(
        &self,
        user_id: i64,
        action: ActionKind,
    ) -> Result<Vec<String>, ScheduleError> {
        let now = Utc::now();
        let rate = governor::check_rate(&*self.repo, &self.config, user_id, action, now).await?;
        if !rate.allowed {
            warn!(user_id, action = action.as_str(), "rate limit denial");
            return Err(ScheduleError::RateLimitExceeded(rate.message));
        }
        let cost = governor::check_cost(&*self.repo, &self.config, user_id, now).await?;
        if !cost.allowed {
            warn!(user_id, action = action.as_str(), "cost limit denial");
            return Err(ScheduleError::CostLimitExceeded(cost.message.unwrap_or_default()));
        }
        Ok(cost.warnings)
    }

    async fn log_action(
        &self,
        user_id: i64,
        team_id: i64,
        action: ActionKind,
        payload_chars: usize,
        success: bool,
    ) {
        let tokens = payload_chars as i32;
        let record = NewUsageRecord {
            user_id,
            team_id: Some(team_id),
            action,
            tokens_used: tokens,
            cost_estimate: (tokens as f64 / 1000.0) * self.config.cost_per_1k_tokens,
            success,
        };
        if let Err(e) = self.repo.log_usage(record).await {
            warn!(user_id, error = %e, "failed to append usage record");
        }
    }

    async fn team(&self, team_id: i64) -> Result<Team, ScheduleError> {
        self.repo
            .team(team_id)
            .await?
            .ok_or(ScheduleError::TeamNotFound(team_id))
    }

    /// Full generation run for a team, starting at the current month.
    pub async fn generate_schedule(
        &self,
        user_id: i64,
        team_id: i64,
        months: u32,
    ) -> Result<GenerationOutcome, ScheduleError> {
        let cost_warnings = self.governed(user_id, ActionKind::Generate).await?;

        let team = self.team(team_id).await?;
        let roster = self.repo.active_roster(team_id).await?;

        let fingerprint = cache::fingerprint(&team, months, roster.len());
        let _guard = self.locks.acquire(&fingerprint).await;

        // Checked under the lock: two racing first-time requests must not
        // both pass and overwrite each other.
        if self.repo.load_schedule(team_id).await?.is_some() {
            return Err(ScheduleError::ScheduleExists(team_id));
        }

        if let Some(payload) = cache::lookup(&*self.repo, &fingerprint).await? {
            match serde_json::from_value::<Schedule>(payload) {
                Ok(schedule) => {
                    self.repo.save_schedule(team_id, &schedule).await?;
                    info!(team_id, "serving cached schedule");
                    return Ok(GenerationOutcome {
                        schedule,
                        report: None,
                        from_cache: true,
                        cost_warnings,
                        post_processing_error: None,
                    });
                }
                Err(e) => warn!(team_id, error = %e, "discarding undecodable cache entry"),
            }
        }

        let contexts = state::roster_contexts(&*self.repo, team_id, &roster).await?;
        let schedule =
            generator::generate(&team, &roster, months, &contexts, MonthKey::current())?;

        let report = validator::run_validation(
            &*self.repo,
            self.oracle.as_ref(),
            &team,
            &schedule,
            &roster,
            &contexts,
        )
        .await?;

        // The schedule is accepted at this point; persistence trouble is
        // reported back rather than failing the generation.
        let post_processing_error = match self.accept(team_id, &fingerprint, &schedule).await {
            Ok(()) => None,
            Err(e) => {
                warn!(team_id, error = %e, "post-processing failed after generation");
                Some(e.to_string())
            }
        };

        let payload_chars = serde_json::to_string(&schedule).map(|s| s.len()).unwrap_or(0);
        self.log_action(user_id, team_id, ActionKind::Generate, payload_chars, true)
            .await;
        info!(team_id, months, violations = report.total_violations, "schedule generated");

        Ok(GenerationOutcome {
            schedule,
            report: Some(report),
            from_cache: false,
            cost_warnings,
            post_processing_error,
        })
    }

    async fn accept(
        &self,
        team_id: i64,
        fingerprint: &str,
        schedule: &Schedule,
    ) -> Result<(), ScheduleError> {
        self.repo.save_schedule(team_id, schedule).await?;
        state::commit(&*self.repo, team_id, schedule).await?;
        cache::store(
            &*self.repo,
            fingerprint,
            CacheKind::Schedule,
            serde_json::to_value(schedule).map_err(crate::store::StoreError::from)?,
            self.config.cache_ttl_hours,
        )
        .await?;
        Ok(())
    }

    /// Validate the stored schedule for a team.
    pub async fn validate_schedule(
        &self,
        user_id: i64,
        team_id: i64,
    ) -> Result<ValidationOutcome, ScheduleError> {
        let cost_warnings = self.governed(user_id, ActionKind::Validate).await?;

        let team = self.team(team_id).await?;
        let stored = self
            .repo
            .load_schedule(team_id)
            .await?
            .ok_or(ScheduleError::ScheduleMissing(team_id))?;

        let payload = serde_json::to_string(&stored.schedule)
            .map_err(crate::store::StoreError::from)?;
        let fingerprint = cache::validation_fingerprint(team_id, &payload);

        if let Some(value) = cache::lookup(&*self.repo, &fingerprint).await? {
            match serde_json::from_value::<ValidationReport>(value) {
                Ok(report) => {
                    self.log_action(user_id, team_id, ActionKind::Validate, payload.len(), true)
                        .await;
                    info!(team_id, "serving cached validation report");
                    return Ok(ValidationOutcome { report, cost_warnings });
                }
                Err(e) => warn!(team_id, error = %e, "discarding undecodable cache entry"),
            }
        }

        let roster = self.repo.active_roster(team_id).await?;
        let contexts = state::roster_contexts(&*self.repo, team_id, &roster).await?;

        let report = validator::run_validation(
            &*self.repo,
            self.oracle.as_ref(),
            &team,
            &stored.schedule,
            &roster,
            &contexts,
        )
        .await?;

        cache::store(
            &*self.repo,
            &fingerprint,
            CacheKind::Validation,
            serde_json::to_value(&report).map_err(crate::store::StoreError::from)?,
            self.config.cache_ttl_hours,
        )
        .await?;

        self.log_action(user_id, team_id, ActionKind::Validate, payload.len(), true)
            .await;

        Ok(ValidationOutcome { report, cost_warnings })
    }

    /// Oracle-backed repair of the stored schedule. A correction is only
    /// accepted after re-validation; a still-violating correction leaves
    /// the original in place.
    pub async fn fix_schedule(
        &self,
        user_id: i64,
        team_id: i64,
    ) -> Result<FixOutcome, ScheduleError> {
        self.governed(user_id, ActionKind::Fix).await?;

        let team = self.team(team_id).await?;
        let stored = self
            .repo
            .load_schedule(team_id)
            .await?
            .ok_or(ScheduleError::ScheduleMissing(team_id))?;
        let roster = self.repo.active_roster(team_id).await?;
        let contexts = state::roster_contexts(&*self.repo, team_id, &roster).await?;

        let report = validator::run_validation(
            &*self.repo,
            self.oracle.as_ref(),
            &team,
            &stored.schedule,
            &roster,
            &contexts,
        )
        .await?;
        if report.violations.is_empty() {
            return Ok(FixOutcome::AlreadyValid { report });
        }

        let oracle = self.oracle.as_ref().ok_or_else(|| {
            ScheduleError::RepairFailed("no advisory oracle configured".to_string())
        })?;
        let corrected = oracle
            .fix(&OracleFixRequest {
                rules: rules::SCHEDULING_RULES_TEXT.to_string(),
                schedule: serde_json::to_value(&stored.schedule)
                    .map_err(crate::store::StoreError::from)?,
                violations: report.violations.iter().map(|v| v.detail.clone()).collect(),
            })
            .await
            .map_err(|e| ScheduleError::RepairFailed(e.to_string()))?;

        let corrected_report = validator::run_validation(
            &*self.repo,
            self.oracle.as_ref(),
            &team,
            &corrected,
            &roster,
            &contexts,
        )
        .await?;

        let payload_chars = serde_json::to_string(&corrected).map(|s| s.len()).unwrap_or(0);
        self.log_action(user_id, team_id, ActionKind::Fix, payload_chars, true)
            .await;

        if corrected_report.is_valid {
            self.repo.save_schedule(team_id, &corrected).await?;
            state::commit(&*self.repo, team_id, &corrected).await?;
            info!(team_id, "oracle correction accepted");
            Ok(FixOutcome::Fixed { report: corrected_report })
        } else {
            warn!(team_id, "oracle correction still violates rules, keeping original");
            Ok(FixOutcome::StillViolating { report: corrected_report })
        }
    }

    /// Degraded-mode path: deterministic, history-blind, one month. Not
    /// governed and not cached; overwrites any stored schedule.
    pub async fn emergency_schedule(&self, team_id: i64) -> Result<Schedule, ScheduleError> {
        let team = self.team(team_id).await?;
        let roster = self.repo.active_roster(team_id).await?;
        let schedule = generator::emergency_generate(&team, &roster, MonthKey::current())?;
        self.repo.save_schedule(team_id, &schedule).await?;
        warn!(team_id, "emergency schedule saved; review before relying on it");
        Ok(schedule)
    }

    /// Delete the stored schedule and its validation artifacts.
    pub async fn delete_schedule(&self, team_id: i64) -> Result<bool, ScheduleError> {
        let deleted = self.repo.delete_schedule(team_id).await?;
        if deleted {
            self.repo.clear_validation_artifacts(team_id).await?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Employee, ScheduleMonth, Severity, ShiftBlock, StaffSlot};
    use crate::store::memory::MemoryRepository;

    async fn seeded_team(repo: &MemoryRepository) -> i64 {
        let team_id = repo.add_team("Platform Ops", "3-shift", 2).await;
        repo.add_employee(team_id, "Asha Verma", "Team Lead", 2).await;
        repo.add_employee(team_id, "Ben Okafor", "Team Lead", 2).await;
        for name in ["Carol Singh", "Dmitri Petrov", "Ella Fontaine", "Farid Khan",
            "Grace Liu", "Hideo Tanaka"]
        {
            repo.add_employee(team_id, name, "Engineer", 3).await;
        }
        team_id
    }

    fn core(repo: &MemoryRepository, config: Config) -> Core {
        Core::new(Arc::new(repo.clone()), config)
            .unwrap_or_else(|e| panic!("core construction failed: {e}"))
    }

    async fn engineers_only_team(repo: &MemoryRepository, count: usize) -> i64 {
        let team_id = repo.add_team("Night Watch", "3-shift", 2).await;
        for i in 0..count {
            repo.add_employee(team_id, &format!("Engineer {i}"), "Engineer", 3).await;
        }
        team_id
    }

    fn slot(e: &Employee) -> StaffSlot {
        StaffSlot {
            employee_id: e.employee_id,
            name: e.full_name.clone(),
            designation: e.designation_title.clone(),
        }
    }

    fn one_month_schedule(shifts: Vec<(&str, Vec<StaffSlot>, Vec<StaffSlot>)>) -> Schedule {
        let month = MonthKey::current();
        Schedule {
            months: vec![ScheduleMonth {
                month,
                label: month.label(),
                shifts: shifts
                    .into_iter()
                    .map(|(shift, assigned_staff, floaters)| ShiftBlock {
                        shift: shift.to_string(),
                        assigned_staff,
                        floaters,
                    })
                    .collect(),
            }],
        }
    }

    /// 2-2-2 split of six engineers with no history: passes every rule.
    fn clean_schedule(roster: &[Employee]) -> Schedule {
        one_month_schedule(vec![
            ("Morning", vec![slot(&roster[0]), slot(&roster[1])], vec![]),
            ("Afternoon", vec![slot(&roster[2]), slot(&roster[3])], vec![]),
            ("Night", vec![slot(&roster[4]), slot(&roster[5])], vec![]),
        ])
    }

    #[tokio::test]
    async fn generation_persists_schedule_history_and_cache() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let core = core(&repo, Config::default());

        let outcome = core.generate_schedule(7, team_id, 1).await.unwrap();
        assert!(!outcome.from_cache);
        assert!(outcome.post_processing_error.is_none());
        assert_eq!(outcome.schedule.months.len(), 1);
        let month = &outcome.schedule.months[0];
        assert_eq!(month.shifts.len(), 3);
        for block in &month.shifts {
            assert_eq!(block.assigned_staff.len(), 2);
        }
        let floaters: usize = month.shifts.iter().map(|s| s.floaters.len()).sum();
        assert_eq!(floaters, 2);

        assert!(repo.load_schedule(team_id).await.unwrap().is_some());
        assert!(!repo.usage_since(7, Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap()
            .is_empty());

        // Every placement is reflected back by the derived context.
        for placement in outcome.schedule.placements() {
            let ctx = state::employee_context(&repo, placement.slot.employee_id, team_id)
                .await
                .unwrap();
            if placement.is_floater {
                assert_eq!(ctx.floater_history, vec![true]);
                assert_eq!(ctx.months_since_floater, 0);
            } else {
                assert_eq!(ctx.last_shifts, vec![placement.shift.to_string()]);
            }
        }
    }

    #[tokio::test]
    async fn regeneration_after_delete_is_served_from_cache() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let core = core(&repo, Config::default());

        let first = core.generate_schedule(7, team_id, 1).await.unwrap();
        assert!(core.delete_schedule(team_id).await.unwrap());

        let second = core.generate_schedule(7, team_id, 1).await.unwrap();
        assert!(second.from_cache);
        assert!(second.report.is_none());
        assert_eq!(second.schedule, first.schedule);
        assert!(repo.load_schedule(team_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn roster_change_invalidates_the_cached_schedule() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let core = core(&repo, Config::default());

        let first = core.generate_schedule(7, team_id, 1).await.unwrap();
        assert!(core.delete_schedule(team_id).await.unwrap());

        // One engineer leaves; the old cache entry must not be replayed.
        let roster = repo.active_roster(team_id).await.unwrap();
        repo.deactivate_employee(roster.last().unwrap().employee_id).await;

        let second = core.generate_schedule(7, team_id, 1).await.unwrap();
        assert!(!second.from_cache);
        assert_ne!(second.schedule, first.schedule);
    }

    #[tokio::test]
    async fn second_generation_for_same_team_is_refused() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let core = core(&repo, Config::default());

        core.generate_schedule(7, team_id, 1).await.unwrap();
        let err = core.generate_schedule(7, team_id, 1).await.unwrap_err();
        assert!(matches!(err, ScheduleError::ScheduleExists(id) if id == team_id));
    }

    #[tokio::test]
    async fn rate_denial_happens_before_any_work() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let config = Config {
            generate_limit: crate::config::RateLimit { limit: 0, window_secs: 3600 },
            ..Config::default()
        };
        let core = core(&repo, config);

        let err = core.generate_schedule(7, team_id, 1).await.unwrap_err();
        assert!(matches!(err, ScheduleError::RateLimitExceeded(_)));
        assert!(repo.load_schedule(team_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn daily_spend_at_ceiling_blocks_generation() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        repo.log_usage_at(
            NewUsageRecord {
                user_id: 7,
                team_id: Some(team_id),
                action: ActionKind::Generate,
                tokens_used: 5_000_000,
                cost_estimate: 10.0,
                success: true,
            },
            Utc::now(),
        )
        .await;
        let core = core(&repo, Config::default());

        let err = core.generate_schedule(7, team_id, 1).await.unwrap_err();
        assert!(matches!(err, ScheduleError::CostLimitExceeded(_)));
    }

    #[tokio::test]
    async fn unreachable_oracle_degrades_validation_without_failing() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let config = Config {
            oracle_url: Some("http://127.0.0.1:9".to_string()),
            oracle_timeout_secs: 1,
            ..Config::default()
        };
        let core = core(&repo, config);

        let outcome = core.generate_schedule(7, team_id, 1).await.unwrap();
        let report = outcome.report.unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.severity, Severity::High);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.contains("Manual review")));
    }

    #[tokio::test]
    async fn emergency_schedule_overwrites_and_skips_governance() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let config = Config {
            generate_limit: crate::config::RateLimit { limit: 0, window_secs: 3600 },
            ..Config::default()
        };
        let core = core(&repo, config);

        // Governed generation is locked out, the degraded path is not.
        let schedule = core.emergency_schedule(team_id).await.unwrap();
        assert_eq!(schedule.months.len(), 1);
        assert!(repo.load_schedule(team_id).await.unwrap().is_some());

        let again = core.emergency_schedule(team_id).await.unwrap();
        assert_eq!(again, schedule);
    }

    #[tokio::test]
    async fn racing_first_generations_produce_exactly_one_schedule() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let core = core(&repo, Config::default());

        let (a, b) = tokio::join!(
            core.generate_schedule(7, team_id, 1),
            core.generate_schedule(8, team_id, 1),
        );
        let err = match (a, b) {
            (Ok(_), Err(e)) | (Err(e), Ok(_)) => e,
            (Ok(_), Ok(_)) => panic!("both racing generations were accepted"),
            (Err(a), Err(b)) => panic!("both refused: {a} / {b}"),
        };
        assert!(matches!(err, ScheduleError::ScheduleExists(id) if id == team_id));
        assert!(repo.load_schedule(team_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn idle_run_locks_are_pruned_on_next_acquire() {
        let locks = RunLocks::new();
        drop(locks.acquire("a").await);
        drop(locks.acquire("b").await);

        let _guard = locks.acquire("c").await;
        let live = locks.inner.lock().unwrap().len();
        assert_eq!(live, 1, "released lock entries kept alive");
    }

    #[tokio::test]
    async fn fix_reports_an_already_valid_schedule() {
        let repo = MemoryRepository::new();
        let team_id = engineers_only_team(&repo, 6).await;
        let roster = repo.active_roster(team_id).await.unwrap();
        repo.save_schedule(team_id, &clean_schedule(&roster)).await.unwrap();
        let core = core(&repo, Config::default());

        let outcome = core.fix_schedule(7, team_id).await.unwrap();
        assert!(matches!(outcome, FixOutcome::AlreadyValid { .. }));
    }

    #[tokio::test]
    async fn fix_without_an_oracle_cannot_repair_and_keeps_the_original() {
        let repo = MemoryRepository::new();
        let team_id = engineers_only_team(&repo, 6).await;
        repo.add_employee(team_id, "Mira Hart", "Director", 1).await;
        let roster = repo.active_roster(team_id).await.unwrap();

        // The director floats: a floater-exemption violation by construction.
        let director = slot(&roster[0]);
        let engineers = &roster[1..];
        let broken = one_month_schedule(vec![
            ("Morning", vec![slot(&engineers[0]), slot(&engineers[1])], vec![director]),
            ("Afternoon", vec![slot(&engineers[2]), slot(&engineers[3])], vec![]),
            ("Night", vec![slot(&engineers[4]), slot(&engineers[5])], vec![]),
        ]);
        repo.save_schedule(team_id, &broken).await.unwrap();
        let core = core(&repo, Config::default());

        let err = core.fix_schedule(7, team_id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::RepairFailed(_)));
        let stored = repo.load_schedule(team_id).await.unwrap().unwrap();
        assert_eq!(stored.schedule, broken, "failed repair touched the stored schedule");
    }

    #[tokio::test]
    async fn validation_reports_are_memoized_per_schedule_content() {
        let repo = MemoryRepository::new();
        let team_id = engineers_only_team(&repo, 6).await;
        let roster = repo.active_roster(team_id).await.unwrap();
        let schedule = clean_schedule(&roster);
        repo.save_schedule(team_id, &schedule).await.unwrap();
        let core = core(&repo, Config::default());

        let first = core.validate_schedule(7, team_id).await.unwrap();
        let second = core.validate_schedule(7, team_id).await.unwrap();
        assert!(first.report.is_valid);
        assert_eq!(second.report.is_valid, first.report.is_valid);

        // Only the first call ran the validator; the second hit the cache.
        assert_eq!(repo.recent_validation_logs(team_id, 10).await.unwrap().len(), 1);
        let payload = serde_json::to_string(&schedule).unwrap();
        let key = cache::validation_fingerprint(team_id, &payload);
        let entries = repo.load_cache_entries(&key).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hit_count, 1);
    }

    #[tokio::test]
    async fn validating_without_a_schedule_is_not_found() {
        let repo = MemoryRepository::new();
        let team_id = seeded_team(&repo).await;
        let core = core(&repo, Config::default());

        let err = core.validate_schedule(7, team_id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::ScheduleMissing(id) if id == team_id));
    }
}
