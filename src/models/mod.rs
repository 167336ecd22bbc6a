// src/models/mod.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Organization reference data (read-only here)
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub employee_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub designation_title: String,
    pub hierarchy_level: i32, // 1 = most senior
    pub monthly_leave_allowance: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
    pub shift_template: String, // "3-shift" | "4-shift" | "5-shift"
    pub people_per_shift: i32,
}

// ───────────────────────────────────────
// Shift templates
// ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftTemplate {
    ThreeShift,
    FourShift,
    FiveShift,
}

impl ShiftTemplate {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "3-shift" => Some(Self::ThreeShift),
            "4-shift" => Some(Self::FourShift),
            "5-shift" => Some(Self::FiveShift),
            _ => None,
        }
    }

    /// Ordered shift list; ordering follows shift desirability
    /// (Morning > Afternoon > Evening > Night > Early Morning).
    pub fn shifts(&self) -> &'static [&'static str] {
        match self {
            Self::ThreeShift => &["Morning", "Afternoon", "Night"],
            Self::FourShift => &["Morning", "Afternoon", "Evening", "Night"],
            Self::FiveShift => &["Morning", "Afternoon", "Evening", "Night", "Early Morning"],
        }
    }
}

// ───────────────────────────────────────
// Month keys
// ───────────────────────────────────────

/// Canonical (year, month) key. Stored and serialized as "YYYY-MM"; the
/// human-readable label ("January 2025") is derived for display and never
/// parsed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32, // 1..=12
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given date.
    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Storage form, e.g. "2025-01".
    pub fn storage(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Display form, e.g. "January 2025".
    pub fn label(&self) -> String {
        // month is 1..=12 by construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| self.storage())
    }

    pub fn parse_storage(s: &str) -> Option<Self> {
        let (y, m) = s.split_once('-')?;
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }
}

impl From<MonthKey> for String {
    fn from(k: MonthKey) -> String {
        k.storage()
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        MonthKey::parse_storage(&s).ok_or_else(|| format!("invalid month key '{s}'"))
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.storage())
    }
}

// ───────────────────────────────────────
// Schedules
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffSlot {
    pub employee_id: i64,
    pub name: String,
    pub designation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShiftBlock {
    pub shift: String,
    pub assigned_staff: Vec<StaffSlot>,
    pub floaters: Vec<StaffSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleMonth {
    pub month: MonthKey,
    pub label: String,
    pub shifts: Vec<ShiftBlock>,
}

/// Multi-month assignment plan, ordered chronologically from the
/// generation month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Schedule {
    pub months: Vec<ScheduleMonth>,
}

impl Schedule {
    /// Iterate every (month, shift, slot, floater-flag) placement.
    pub fn placements(&self) -> impl Iterator<Item = Placement<'_>> {
        self.months.iter().flat_map(|m| {
            m.shifts.iter().flat_map(move |s| {
                let fixed = s.assigned_staff.iter().map(move |slot| Placement {
                    month: m.month,
                    shift: &s.shift,
                    slot,
                    is_floater: false,
                });
                let floaters = s.floaters.iter().map(move |slot| Placement {
                    month: m.month,
                    shift: &s.shift,
                    slot,
                    is_floater: true,
                });
                fixed.chain(floaters)
            })
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub month: MonthKey,
    pub shift: &'a str,
    pub slot: &'a StaffSlot,
    pub is_floater: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub team_id: i64,
    pub schedule: Schedule,
    pub generated_on: DateTime<Utc>,
}

// ───────────────────────────────────────
// Assignment history
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentRecord {
    pub employee_id: i64,
    pub team_id: i64,
    pub month: String, // MonthKey storage form; unique per (employee, team, month)
    pub shift_assigned: Option<String>,
    pub was_floater: bool,
    pub floater_for_shift: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-employee scheduling context derived from the newest history
/// records. Computed fresh per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmployeeContext {
    /// Assigned shifts, most recent first. Floater months carry no shift.
    pub last_shifts: Vec<String>,
    /// Floater flags, most recent first.
    pub floater_history: Vec<bool>,
    /// Index of the newest floater record; history length when none found.
    pub months_since_floater: usize,
    /// Leading records sharing the same assigned shift.
    pub consecutive_shift_streak: usize,
}

// ───────────────────────────────────────
// Validation
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub rule: Option<i32>,
    pub detail: String,
    pub employee: Option<String>,
    pub month: Option<MonthKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub total_violations: usize,
    pub violations: Vec<Violation>,
    pub severity: Severity,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ValidationLogEntry {
    pub validation_log_id: i64,
    pub team_id: i64,
    pub result: serde_json::Value,
    pub violations_found: i32,
    pub is_valid: bool,
    pub validated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ViolationRecord {
    pub violation_id: i64,
    pub team_id: i64,
    pub rule_number: i32,
    pub detail: String,
    pub employee_affected: Option<String>,
    pub month: Option<String>,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Cache & usage
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Schedule,
    Validation,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Validation => "validation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CacheEntry {
    pub cache_entry_id: i64,
    pub cache_key: String,
    pub cache_type: String,
    pub cached_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Generate,
    Validate,
    Fix,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Validate => "validate",
            Self::Fix => "fix",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    pub usage_id: i64,
    pub user_id: i64,
    pub team_id: Option<i64>,
    pub action: String, // ActionKind storage form
    pub tokens_used: i32,
    pub cost_estimate: f64,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_wraps_year() {
        let dec = MonthKey::new(2024, 12).unwrap();
        assert_eq!(dec.next(), MonthKey::new(2025, 1).unwrap());
        assert_eq!(dec.storage(), "2024-12");
        assert_eq!(dec.label(), "December 2024");
    }

    #[test]
    fn month_key_storage_round_trip() {
        let k = MonthKey::new(2025, 3).unwrap();
        assert_eq!(MonthKey::parse_storage(&k.storage()), Some(k));
        assert!(MonthKey::parse_storage("2025-13").is_none());
        assert!(MonthKey::parse_storage("March 2025").is_none());
    }

    #[test]
    fn five_shift_template_keeps_desirability_order() {
        let t = ShiftTemplate::parse("5-shift").unwrap();
        assert_eq!(
            t.shifts(),
            &["Morning", "Afternoon", "Evening", "Night", "Early Morning"]
        );
        assert!(ShiftTemplate::parse("6-shift").is_none());
    }
}
