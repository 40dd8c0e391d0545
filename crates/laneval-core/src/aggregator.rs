//! Result aggregation.
//!
//! Every run is finalized through exactly one `record_*` call. Each call sets
//! the run's issues, severity and `passed` flag and adds its issues to the
//! global totals. Requirements are rolled up once all runs are final.

use serde::{Deserialize, Serialize};

use crate::error::ValidatorFault;
use crate::gate::GATE_CLOSED_MESSAGE;
use crate::issue::{Issue, Severity};
use crate::spec::{RequirementSpec, RunIndex, RunOutcome};

/// Message of the issue attached to a run the scheduler excluded.
pub const EXCLUDED_MESSAGE: &str = "prerequisite missing or cyclic";

/// Issue counts across all runs of a pass. Each run counts once, however
/// many requirements reference it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTotals {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueTotals {
    /// Issues that make the process exit unsuccessfully.
    pub fn failing(&self) -> usize {
        self.errors + self.warnings
    }

    pub fn is_clean(&self) -> bool {
        self.failing() == 0
    }

    pub fn add(&mut self, issues: &[Issue]) {
        for issue in issues {
            match issue.severity {
                Severity::Error => self.errors += 1,
                Severity::Warning => self.warnings += 1,
                Severity::Info => self.infos += 1,
                Severity::None => {}
            }
        }
    }
}

/// Accumulates results into a [`RequirementSpec`].
#[derive(Debug, Default)]
pub struct ResultAggregator {
    totals: IssueTotals,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn totals(&self) -> IssueTotals {
        self.totals
    }

    /// The check ran and returned `issues`.
    pub fn record_executed(
        &mut self,
        spec: &mut RequirementSpec,
        index: RunIndex,
        issues: Vec<Issue>,
    ) {
        self.finalize(spec, index, RunOutcome::Executed, issues);
    }

    /// The gate was closed; the check was not invoked.
    pub fn record_skipped(&mut self, spec: &mut RequirementSpec, index: RunIndex) {
        self.finalize(
            spec,
            index,
            RunOutcome::Skipped,
            vec![Issue::orchestration(GATE_CLOSED_MESSAGE)],
        );
    }

    /// The scheduler excluded the run.
    pub fn record_excluded(&mut self, spec: &mut RequirementSpec, index: RunIndex) {
        self.finalize(
            spec,
            index,
            RunOutcome::Excluded,
            vec![Issue::orchestration(EXCLUDED_MESSAGE)],
        );
    }

    /// The check was invoked but faulted; the fault is contained to this run.
    pub fn record_faulted(
        &mut self,
        spec: &mut RequirementSpec,
        index: RunIndex,
        fault: &ValidatorFault,
    ) {
        self.finalize(
            spec,
            index,
            RunOutcome::Faulted,
            vec![Issue::orchestration(format!(
                "validator execution failed: {fault}"
            ))],
        );
    }

    fn finalize(
        &mut self,
        spec: &mut RequirementSpec,
        index: RunIndex,
        outcome: RunOutcome,
        issues: Vec<Issue>,
    ) {
        let run = spec.run_mut(index);
        debug_assert!(
            run.outcome.is_none(),
            "validator run '{}' finalized twice",
            run.name()
        );

        self.totals.add(&issues);
        run.severity = Severity::max_of(&issues);
        run.passed = outcome == RunOutcome::Executed && issues.is_empty();
        run.issues = issues;
        run.outcome = Some(outcome);
    }

    /// Roll up requirement verdicts: a requirement passes iff every one of
    /// its runs passed.
    pub fn roll_up(&self, spec: &mut RequirementSpec) {
        let verdicts: Vec<bool> = spec
            .requirements()
            .iter()
            .map(|req| req.validators().iter().all(|&idx| spec.run(idx).passed()))
            .collect();
        for (req, passed) in spec.requirements_mut().iter_mut().zip(verdicts) {
            req.passed = passed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Primitive;
    use serde_json::json;

    fn spec() -> RequirementSpec {
        RequirementSpec::from_value(json!({
            "requirements": [
                {"id": "R1", "validators": [{"name": "A"}, {"name": "B"}]},
                {"id": "R2", "validators": [{"name": "A"}]},
                {"id": "empty", "validators": []}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_clean_execution_passes() {
        let mut spec = spec();
        let mut agg = ResultAggregator::new();
        agg.record_executed(&mut spec, 0, vec![]);
        let a = spec.run(0);
        assert!(a.passed());
        assert_eq!(a.severity(), Severity::None);
        assert_eq!(a.outcome(), Some(RunOutcome::Executed));
        assert!(agg.totals().is_clean());
    }

    #[test]
    fn test_severity_is_max_of_issues() {
        let mut spec = spec();
        let mut agg = ResultAggregator::new();
        agg.record_executed(
            &mut spec,
            0,
            vec![
                Issue::info(Primitive::Point, 1, "i"),
                Issue::warning(Primitive::Point, 2, "w"),
            ],
        );
        let a = spec.run(0);
        assert!(!a.passed());
        assert_eq!(a.severity(), Severity::Warning);
        assert_eq!(
            agg.totals(),
            IssueTotals {
                errors: 0,
                warnings: 1,
                infos: 1
            }
        );
    }

    #[test]
    fn test_info_only_fails_run_but_not_totals() {
        let mut spec = spec();
        let mut agg = ResultAggregator::new();
        agg.record_executed(&mut spec, 0, vec![Issue::info(Primitive::Lanelet, 9, "fyi")]);
        assert!(!spec.run(0).passed());
        assert!(agg.totals().is_clean());
    }

    #[test]
    fn test_skip_and_exclusion_count_as_errors() {
        let mut spec = spec();
        let mut agg = ResultAggregator::new();
        agg.record_skipped(&mut spec, 0);
        agg.record_excluded(&mut spec, 1);

        assert_eq!(spec.run(0).issues()[0].message, GATE_CLOSED_MESSAGE);
        assert_eq!(spec.run(0).severity(), Severity::Error);
        assert_eq!(spec.run(1).issues()[0].message, EXCLUDED_MESSAGE);
        assert_eq!(spec.run(1).outcome(), Some(RunOutcome::Excluded));
        assert_eq!(agg.totals().errors, 2);
    }

    #[test]
    fn test_fault_becomes_local_error() {
        let mut spec = spec();
        let mut agg = ResultAggregator::new();
        let fault = ValidatorFault::Failed {
            name: "A".to_string(),
            reason: "boom".to_string(),
        };
        agg.record_faulted(&mut spec, 0, &fault);
        let a = spec.run(0);
        assert_eq!(a.severity(), Severity::Error);
        assert!(a.issues()[0].message.contains("boom"));
        assert_eq!(a.issues()[0].primitive, Primitive::Primitive);
    }

    #[test]
    fn test_roll_up_uses_shared_runs() {
        let mut spec = spec();
        let mut agg = ResultAggregator::new();
        agg.record_executed(&mut spec, 0, vec![]);
        agg.record_executed(
            &mut spec,
            1,
            vec![Issue::error(Primitive::Lanelet, 1, "bad")],
        );
        agg.roll_up(&mut spec);

        let reqs = spec.requirements();
        assert!(!reqs[0].passed());
        assert!(reqs[1].passed());
        assert!(reqs[2].passed(), "empty requirement passes vacuously");
    }
}
