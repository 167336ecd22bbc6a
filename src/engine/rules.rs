// src/engine/rules.rs

//! Rule numbering, the stability-policy table, and the canonical rule
//! text shipped to the advisory oracle.

/// Rule numbers for the locally-checkable rules, matching the numbered
/// sections of [`SCHEDULING_RULES_TEXT`]. Rules 1 and 5 are satisfied by
/// construction in the generator and have no standalone check.
pub const RULE_FLOATER_EXEMPTION: i32 = 2;
pub const RULE_NO_CONSECUTIVE_FLOAT: i32 = 3;
pub const RULE_SHIFT_ROTATION: i32 = 4;

/// What a hierarchy tier is entitled to: how many consecutive months it
/// may keep the same shift, and whether it can be drawn as a floater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilityPolicy {
    pub window_months: u32,
    pub may_float: bool,
}

impl StabilityPolicy {
    /// A one-month window means the employee must rotate every month.
    pub fn must_rotate_monthly(&self) -> bool {
        self.window_months <= 1
    }
}

/// Single lookup point for tier entitlements; rule changes stay here.
pub fn policy_for(hierarchy_level: i32) -> StabilityPolicy {
    match hierarchy_level {
        1 => StabilityPolicy { window_months: 3, may_float: false },
        2 => StabilityPolicy { window_months: 2, may_float: true },
        _ => StabilityPolicy { window_months: 1, may_float: true },
    }
}

pub const SCHEDULING_RULES_TEXT: &str = "\
STRICT SCHEDULING RULES (ALL MUST BE ENFORCED):

1. TIERED STABILITY RULE:
   - Top hierarchy (Level 1): 3 months stability on same shift
   - Second hierarchy (Level 2): 2 months stability on same shift
   - All lower hierarchies: MUST rotate shifts every month (NO exceptions)

2. FLOATER EXEMPTION RULE:
   - Highest hierarchy employees CANNOT be assigned as floaters
   - Only Level 2 and below can be floaters

3. FAIR FLOATER ROTATION RULE:
   - NO employee can be floater for 2 consecutive months
   - If employee was floater last month, they MUST be in fixed staff this month

4. GUARANTEED SHIFT ROTATION RULE:
   - Employees without stability perks MUST get different shift than previous month

5. MIXED-HIERARCHY TEAM COMPOSITION:
   - Each shift team must contain mix of hierarchy levels
   - No shift can have all same-level employees

VALIDATION REQUIREMENTS:
- Every assignment must be checked against employee history
- Any rule violation must be flagged immediately
- Provide specific employee names and months in violation reports
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_table_matches_rule_one() {
        assert_eq!(policy_for(1), StabilityPolicy { window_months: 3, may_float: false });
        assert_eq!(policy_for(2), StabilityPolicy { window_months: 2, may_float: true });
        assert_eq!(policy_for(3), StabilityPolicy { window_months: 1, may_float: true });
        assert_eq!(policy_for(9), StabilityPolicy { window_months: 1, may_float: true });
        assert!(policy_for(3).must_rotate_monthly());
        assert!(!policy_for(2).must_rotate_monthly());
    }
}
