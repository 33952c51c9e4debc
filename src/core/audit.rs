/// Keywords whose presence in an audit report marks the plan as infeasible
/// for the stated budget. Pure substring search, case-insensitive.
pub const BUDGET_FAILURE_KEYWORDS: &[&str] = &[
    "fail",
    "infeasible",
    "exceeds budget",
    "over budget",
    "cannot be met",
    "budget alert",
    "budget notification",
    "critical budget",
    "not feasible",
];

/// True when the audit stage's report indicates the budget cannot hold, which
/// interrupts the pipeline for user confirmation.
pub fn flags_budget_failure(report: &str) -> bool {
    let lower = report.to_lowercase();
    BUDGET_FAILURE_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}
