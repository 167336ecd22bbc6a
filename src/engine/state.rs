// src/engine/state.rs

//! Historical-state manager: derives per-employee scheduling context from
//! assignment history and is the sole writer of new history records.

use std::collections::HashMap;

use crate::models::{AssignmentRecord, Employee, EmployeeContext, Schedule};
use crate::store::{NewAssignmentRecord, Repository, StoreError};

/// How far back context derivation looks.
pub const HISTORY_WINDOW: usize = 3;

/// Derive a context from newest-first history records.
pub fn context_from_records(records: &[AssignmentRecord]) -> EmployeeContext {
    let last_shifts: Vec<String> = records
        .iter()
        .filter_map(|r| r.shift_assigned.clone())
        .collect();
    let floater_history: Vec<bool> = records.iter().map(|r| r.was_floater).collect();

    // "Never floated" is encoded as the window length.
    let months_since_floater = records
        .iter()
        .position(|r| r.was_floater)
        .unwrap_or(records.len());

    let consecutive_shift_streak = match records.first().and_then(|r| r.shift_assigned.as_deref()) {
        Some(current) => records
            .iter()
            .take_while(|r| r.shift_assigned.as_deref() == Some(current))
            .count(),
        None => 0,
    };

    EmployeeContext {
        last_shifts,
        floater_history,
        months_since_floater,
        consecutive_shift_streak,
    }
}

pub async fn employee_context(
    repo: &dyn Repository,
    employee_id: i64,
    team_id: i64,
) -> Result<EmployeeContext, StoreError> {
    let records = repo.load_history(employee_id, team_id, HISTORY_WINDOW).await?;
    Ok(context_from_records(&records))
}

/// Contexts for a whole roster, keyed by employee id.
pub async fn roster_contexts(
    repo: &dyn Repository,
    team_id: i64,
    roster: &[Employee],
) -> Result<HashMap<i64, EmployeeContext>, StoreError> {
    let mut contexts = HashMap::with_capacity(roster.len());
    for emp in roster {
        contexts.insert(
            emp.employee_id,
            employee_context(repo, emp.employee_id, team_id).await?,
        );
    }
    Ok(contexts)
}

/// Persist one history record per employee per month of an accepted
/// schedule. Upserts are keyed by (employee, team, month), so committing
/// the same month twice overwrites rather than duplicates; callers must
/// still invoke this exactly once per accepted generation to keep
/// rotation windows honest.
pub async fn commit(
    repo: &dyn Repository,
    team_id: i64,
    schedule: &Schedule,
) -> Result<(), StoreError> {
    for placement in schedule.placements() {
        let record = if placement.is_floater {
            NewAssignmentRecord {
                employee_id: placement.slot.employee_id,
                team_id,
                month: placement.month,
                shift_assigned: None,
                was_floater: true,
                floater_for_shift: Some(placement.shift.to_string()),
            }
        } else {
            NewAssignmentRecord {
                employee_id: placement.slot.employee_id,
                team_id,
                month: placement.month,
                shift_assigned: Some(placement.shift.to_string()),
                was_floater: false,
                floater_for_shift: None,
            }
        };
        repo.upsert_history(record).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(month: &str, shift: Option<&str>, was_floater: bool) -> AssignmentRecord {
        AssignmentRecord {
            employee_id: 1,
            team_id: 1,
            month: month.to_string(),
            shift_assigned: shift.map(str::to_string),
            was_floater,
            floater_for_shift: was_floater.then(|| "Morning".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn context_of_empty_history() {
        let ctx = context_from_records(&[]);
        assert_eq!(ctx, EmployeeContext::default());
        assert_eq!(ctx.months_since_floater, 0);
    }

    #[test]
    fn months_since_floater_counts_from_newest() {
        let records = vec![
            record("2025-03", Some("Morning"), false),
            record("2025-02", None, true),
            record("2025-01", Some("Night"), false),
        ];
        let ctx = context_from_records(&records);
        assert_eq!(ctx.months_since_floater, 1);
        assert_eq!(ctx.floater_history, vec![false, true, false]);
        assert_eq!(ctx.last_shifts, vec!["Morning", "Night"]);
    }

    #[test]
    fn never_floated_encodes_window_length() {
        let records = vec![
            record("2025-03", Some("Morning"), false),
            record("2025-02", Some("Morning"), false),
            record("2025-01", Some("Afternoon"), false),
        ];
        let ctx = context_from_records(&records);
        assert_eq!(ctx.months_since_floater, 3);
        assert_eq!(ctx.consecutive_shift_streak, 2);
    }
}
