// src/engine/validator.rs

//! Rule validator: a deterministic local pass over a schedule plus an
//! optional second opinion from the advisory oracle. Every call leaves a
//! validation log entry and per-violation records behind.

use std::collections::HashMap;

use tracing::warn;

use super::rules::{
    RULE_FLOATER_EXEMPTION, RULE_NO_CONSECUTIVE_FLOAT, RULE_SHIFT_ROTATION,
    SCHEDULING_RULES_TEXT, policy_for,
};
use crate::models::{
    Employee, EmployeeContext, Schedule, Severity, Team, ValidationReport, Violation,
};
use crate::oracle::{OracleClient, OracleValidationRequest};
use crate::store::{NewValidationLog, NewViolationRecord, Repository, StoreError};

/// Deterministic pass: checks every placement against the employee's
/// historical context. Contexts here are the persisted ones — unlike the
/// generator, the validator never chains months, because it must judge
/// stored or externally-modified schedules as they stand.
pub fn validate_local(
    schedule: &Schedule,
    roster: &[Employee],
    contexts: &HashMap<i64, EmployeeContext>,
) -> Vec<Violation> {
    let by_id: HashMap<i64, &Employee> =
        roster.iter().map(|e| (e.employee_id, e)).collect();
    let mut violations = Vec::new();

    for p in schedule.placements() {
        let Some(emp) = by_id.get(&p.slot.employee_id) else {
            violations.push(Violation {
                rule: None,
                detail: format!(
                    "{} is not an active member of this team",
                    p.slot.name
                ),
                employee: Some(p.slot.name.clone()),
                month: Some(p.month),
            });
            continue;
        };
        let ctx = contexts.get(&emp.employee_id);
        let policy = policy_for(emp.hierarchy_level);

        if p.is_floater && !policy.may_float {
            violations.push(Violation {
                rule: Some(RULE_FLOATER_EXEMPTION),
                detail: format!(
                    "{} (top hierarchy) cannot be assigned as floater in {}",
                    emp.full_name,
                    p.month.label()
                ),
                employee: Some(emp.full_name.clone()),
                month: Some(p.month),
            });
        }

        if p.is_floater
            && ctx.and_then(|c| c.floater_history.first()).copied() == Some(true)
        {
            violations.push(Violation {
                rule: Some(RULE_NO_CONSECUTIVE_FLOAT),
                detail: format!(
                    "{} was floater last month, cannot be floater again in {}",
                    emp.full_name,
                    p.month.label()
                ),
                employee: Some(emp.full_name.clone()),
                month: Some(p.month),
            });
        }

        if !p.is_floater && policy.must_rotate_monthly() {
            // `last_shifts` skips floater records, so when the newest
            // record is a floater month there is no "last month's shift"
            // to rotate away from.
            let floated_last = ctx.and_then(|c| c.floater_history.first()).copied() == Some(true);
            let last = ctx.and_then(|c| c.last_shifts.first());
            if !floated_last && last.is_some_and(|s| s == p.shift) {
                violations.push(Violation {
                    rule: Some(RULE_SHIFT_ROTATION),
                    detail: format!(
                        "{} had {} shift last month, must rotate in {}",
                        emp.full_name,
                        p.shift,
                        p.month.label()
                    ),
                    employee: Some(emp.full_name.clone()),
                    month: Some(p.month),
                });
            }
        }
    }

    violations
}

fn local_only_report(violations: Vec<Violation>) -> ValidationReport {
    let severity = if violations.is_empty() { Severity::Low } else { Severity::Medium };
    ValidationReport {
        is_valid: violations.is_empty(),
        total_violations: violations.len(),
        severity,
        violations,
        recommendations: Vec::new(),
    }
}

fn degraded_report(mut violations: Vec<Violation>, error: &str) -> ValidationReport {
    violations.push(Violation {
        rule: None,
        detail: format!("oracle validation error: {error}"),
        employee: None,
        month: None,
    });
    ValidationReport {
        is_valid: false,
        total_violations: violations.len(),
        severity: Severity::High,
        violations,
        recommendations: vec![
            "Manual review required due to oracle validation failure".to_string(),
        ],
    }
}

/// Run the full validation: local pass, oracle pass when a client is
/// configured, then log the merged report. Oracle trouble degrades to the
/// local-only report at high severity — it is never fatal to the caller.
pub async fn run_validation(
    repo: &dyn Repository,
    oracle: Option<&OracleClient>,
    team: &Team,
    schedule: &Schedule,
    roster: &[Employee],
    contexts: &HashMap<i64, EmployeeContext>,
) -> Result<ValidationReport, StoreError> {
    let local = validate_local(schedule, roster, contexts);

    let report = match oracle {
        None => local_only_report(local),
        Some(client) => {
            let request = OracleValidationRequest {
                rules: SCHEDULING_RULES_TEXT.to_string(),
                schedule: serde_json::to_value(schedule)?,
                local_violations: local.iter().map(|v| v.detail.clone()).collect(),
            };
            match client.validate(&request).await {
                Ok(oracle_report) => {
                    let mut violations = local;
                    violations.extend(oracle_report.violations.into_iter().map(|detail| {
                        Violation { rule: None, detail, employee: None, month: None }
                    }));
                    let local_severity = if violations.is_empty() {
                        Severity::Low
                    } else {
                        Severity::Medium
                    };
                    ValidationReport {
                        is_valid: oracle_report.is_valid && violations.is_empty(),
                        total_violations: violations.len(),
                        severity: oracle_report.severity.max(local_severity),
                        violations,
                        recommendations: oracle_report.recommendations,
                    }
                }
                Err(e) => {
                    warn!(team_id = team.team_id, error = %e, "oracle pass failed, degrading to local-only");
                    degraded_report(local, &e.to_string())
                }
            }
        }
    };

    repo.log_validation(NewValidationLog {
        team_id: team.team_id,
        result: serde_json::to_value(&report)?,
        violations_found: report.total_violations as i32,
        is_valid: report.is_valid,
    })
    .await?;
    for v in &report.violations {
        repo.record_violation(NewViolationRecord {
            team_id: team.team_id,
            rule_number: v.rule.unwrap_or(0),
            detail: v.detail.clone(),
            employee_affected: v.employee.clone(),
            month: v.month,
        })
        .await?;
    }

    Ok(report)
}
