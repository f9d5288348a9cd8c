// SPDX-License-Identifier: AGPL-3.0-only

//! Check harness shared by the wellspring binaries.
//!
//! Every binary follows the same pattern:
//!   - Hardcoded expected values with a documented origin
//!   - Explicit pass/fail checks against named tolerances
//!   - Exit code 0 (all checks pass) or 1 (any check fails)
//!   - Machine-readable summary on stdout
//!
//! Gates from the verification ladder plug in directly via
//! [`GateHarness::gate`], so a binary can mix ladder outcomes with ad-hoc
//! numeric checks in one summary.

use crate::verify::GateReport;
use std::process;

/// One recorded check.
#[derive(Debug, Clone)]
pub struct Check {
    pub label: String,
    pub passed: bool,
    pub observed: f64,
    pub expected: f64,
    pub tolerance: f64,
    pub mode: CheckMode,
}

/// How the tolerance was applied.
#[derive(Debug, Clone, Copy)]
pub enum CheckMode {
    /// |observed − expected| / |expected| < tolerance.
    Relative,
    /// observed < threshold.
    UpperBound,
    /// Integer equality (counts).
    Count,
    /// Boolean pass/fail.
    Flag,
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relative => write!(f, "rel"),
            Self::UpperBound => write!(f, "<"),
            Self::Count => write!(f, "count"),
            Self::Flag => write!(f, "flag"),
        }
    }
}

/// Accumulates checks and produces a summary with exit code.
#[derive(Debug, Default)]
#[must_use]
pub struct GateHarness {
    pub name: String,
    pub checks: Vec<Check>,
}

impl GateHarness {
    #[must_use = "harness must be used to run checks"]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    /// Relative tolerance check; falls back to absolute when the expected
    /// value is zero.
    pub fn check_rel(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = if expected.abs() > f64::EPSILON {
            ((observed - expected) / expected).abs() < tolerance
        } else {
            observed.abs() < tolerance
        };
        self.checks.push(Check {
            label: label.to_string(),
            passed,
            observed,
            expected,
            tolerance,
            mode: CheckMode::Relative,
        });
    }

    /// Upper-bound check: observed < threshold.
    pub fn check_upper(&mut self, label: &str, observed: f64, threshold: f64) {
        self.checks.push(Check {
            label: label.to_string(),
            passed: observed < threshold,
            observed,
            expected: threshold,
            tolerance: threshold,
            mode: CheckMode::UpperBound,
        });
    }

    /// Integer-count equality check.
    pub fn check_count(&mut self, label: &str, observed: usize, expected: usize) {
        self.checks.push(Check {
            label: label.to_string(),
            passed: observed == expected,
            observed: observed as f64,
            expected: expected as f64,
            tolerance: 0.0,
            mode: CheckMode::Count,
        });
    }

    /// Boolean pass/fail check.
    pub fn check_flag(&mut self, label: &str, passed: bool) {
        self.checks.push(Check {
            label: label.to_string(),
            passed,
            observed: f64::from(u8::from(passed)),
            expected: 1.0,
            tolerance: 0.0,
            mode: CheckMode::Flag,
        });
    }

    /// Record a verification-ladder gate as a check; the gate's worst
    /// deviation becomes the observed value.
    pub fn gate(&mut self, report: &GateReport) {
        self.checks.push(Check {
            label: format!("{:?} [{}]", report.gate, report.detail),
            passed: report.passed,
            observed: report.worst,
            expected: 0.0,
            tolerance: 0.0,
            mode: CheckMode::Flag,
        });
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.checks.len()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    fn render(&self) -> String {
        use std::fmt::Write;
        let mut s = String::new();
        let _ = writeln!(
            s,
            "═══ {}: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.total_count()
        );
        for check in &self.checks {
            let icon = if check.passed { "✓" } else { "✗" };
            let _ = writeln!(
                s,
                "  {icon} {}: observed={:.6e}, expected={:.6e}, tol={:.2e} ({})",
                check.label, check.observed, check.expected, check.tolerance, check.mode
            );
        }
        s
    }

    /// Print the summary and exit 0 or 1.
    pub fn finish(&self) -> ! {
        println!();
        print!("{}", self.render());
        if self.all_passed() {
            println!("ALL CHECKS PASSED");
            process::exit(0);
        } else {
            let failed: Vec<&str> = self
                .checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.label.as_str())
                .collect();
            println!("FAILED CHECKS: {}", failed.join(", "));
            process::exit(1);
        }
    }

    /// Summary text without exiting, for tests.
    #[must_use]
    pub fn summary(&self) -> String {
        self.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::Gate;

    #[test]
    fn tracks_pass_fail() {
        let mut h = GateHarness::new("test");
        h.check_rel("exact", 1.0, 1.0, 1e-10);
        h.check_rel("close", 1.0001, 1.0, 1e-3);
        h.check_rel("far", 2.0, 1.0, 1e-3);
        assert_eq!(h.passed_count(), 2);
        assert_eq!(h.total_count(), 3);
        assert!(!h.all_passed());
    }

    #[test]
    fn relative_check_handles_zero_expected() {
        let mut h = GateHarness::new("test");
        h.check_rel("near_zero", 1e-15, 0.0, 1e-10);
        assert!(h.checks[0].passed);
        h.check_rel("large_vs_zero", 1.0, 0.0, 1e-10);
        assert!(!h.checks[1].passed);
    }

    #[test]
    fn count_and_flag_checks() {
        let mut h = GateHarness::new("test");
        h.check_count("levels", 3, 3);
        h.check_count("wrong", 2, 3);
        h.check_flag("ok", true);
        assert_eq!(h.passed_count(), 2);
    }

    #[test]
    fn upper_bound_equal_fails() {
        let mut h = GateHarness::new("test");
        h.check_upper("at", 1.0, 1.0);
        assert!(!h.checks[0].passed);
        h.check_upper("below", 0.5, 1.0);
        assert!(h.checks[1].passed);
    }

    #[test]
    fn gate_report_becomes_check() {
        let mut h = GateHarness::new("test");
        h.gate(&GateReport {
            gate: Gate::V1,
            passed: true,
            worst: 3e-6,
            detail: "2 levels cross-checked".to_owned(),
        });
        assert!(h.all_passed());
        assert!(h.summary().contains("V1"));
    }

    #[test]
    fn empty_harness_vacuously_passes() {
        let h = GateHarness::new("empty");
        assert!(h.all_passed());
        assert_eq!(h.total_count(), 0);
    }

    #[test]
    fn summary_lists_failures() {
        let mut h = GateHarness::new("summary");
        h.check_rel("good", 1.0, 1.0, 0.1);
        h.check_rel("bad", 2.0, 1.0, 0.01);
        let s = h.summary();
        assert!(s.contains("1/2"));
        assert!(s.contains('✗'));
    }
}
