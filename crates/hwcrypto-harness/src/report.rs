//! Check outcomes and the aggregated validation report.

use std::fmt;

/// How a single check ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Every assertion held.
    Pass,
    /// An assertion failed or the device returned an unexpected error.
    Fail {
        /// What went wrong.
        reason: String,
    },
    /// The device does not implement an algorithm the check needs.
    Skipped {
        /// Why the check did not run.
        reason: String,
    },
}

/// Result of one named check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Stable check name.
    pub name: &'static str,
    /// How the check ended.
    pub status: CheckStatus,
}

impl CheckOutcome {
    /// Whether the check passed.
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    /// Whether the check failed.
    pub fn failed(&self) -> bool {
        matches!(self.status, CheckStatus::Fail { .. })
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            CheckStatus::Pass => write!(f, "{}: pass", self.name),
            CheckStatus::Fail { reason } => write!(f, "{}: FAIL ({reason})", self.name),
            CheckStatus::Skipped { reason } => write!(f, "{}: skipped ({reason})", self.name),
        }
    }
}

/// Outcomes of a validation run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    outcomes: Vec<CheckOutcome>,
}

impl ValidationReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an outcome.
    pub fn record(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// All outcomes.
    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    /// Looks up an outcome by check name.
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    /// Number of passed checks.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.passed()).count()
    }

    /// Number of failed checks.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.failed()).count()
    }

    /// Number of skipped checks.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.passed() - self.failed()
    }

    /// True when no check failed. Skipped checks do not count against it.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}
