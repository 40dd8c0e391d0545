//! Requirement-based validation orchestration.
//!
//! One pass over a [`RequirementSpec`]:
//!
//! 1. build the [`DependencyGraph`] and schedule it;
//! 2. finalize every excluded run with a standing ERROR;
//! 3. walk the order, and for each run either skip it (gate closed) or
//!    invoke its check and record the issues.
//!
//! Every run is finalized exactly once because the pass visits each index
//! once, either in `excluded` or in `order`. Prerequisites come first in the
//! order, so the gate always sees final severities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregator::ResultAggregator;
use crate::error::{LanevalError, Result};
use crate::gate::evaluate_gate;
use crate::graph::DependencyGraph;
use crate::issue::Issue;
use crate::map::LaneletMap;
use crate::obs;
use crate::report::{DetectedIssues, ValidationReport};
use crate::spec::{RequirementSpec, ValidatorRun};
use crate::validator::{ValidationConfig, ValidatorCatalog};

/// What to do when a check cannot produce a result: it is not registered,
/// it returned a [`ValidatorFault`], or it panicked.
///
/// [`ValidatorFault`]: crate::error::ValidatorFault
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Record one ERROR issue on the faulting run and continue.
    #[default]
    Contain,
    /// Stop the pass and return the fault as an error.
    Abort,
}

impl FromStr for FaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "contain" => Ok(FaultPolicy::Contain),
            "abort" => Ok(FaultPolicy::Abort),
            other => Err(format!(
                "unknown fault policy '{other}' (expected 'contain' or 'abort')"
            )),
        }
    }
}

impl fmt::Display for FaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultPolicy::Contain => f.write_str("contain"),
            FaultPolicy::Abort => f.write_str("abort"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub fault_policy: FaultPolicy,
}

/// Runs requirement specs against a map using an injected catalog.
#[derive(Debug)]
pub struct RequirementOrchestrator<'c> {
    catalog: &'c ValidatorCatalog,
    config: OrchestratorConfig,
}

impl<'c> RequirementOrchestrator<'c> {
    pub fn new(catalog: &'c ValidatorCatalog, config: OrchestratorConfig) -> Self {
        Self { catalog, config }
    }

    /// Execute one orchestration pass and return the finalized report.
    pub fn run(&self, mut spec: RequirementSpec, map: &LaneletMap) -> Result<ValidationReport> {
        let spec_digest = spec.digest();
        let _span = obs::ValidationSpan::enter(&spec_digest);
        obs::emit_validation_started(
            &spec_digest,
            spec.requirements().len(),
            spec.runs().len(),
        );

        let graph = DependencyGraph::build(spec.runs());
        let schedule = graph.schedule();
        let mut aggregator = ResultAggregator::new();

        for &idx in &schedule.excluded {
            obs::emit_validator_excluded(spec.run(idx).name(), graph.unresolved_of(idx));
            aggregator.record_excluded(&mut spec, idx);
        }

        for &idx in &schedule.order {
            let verdict = evaluate_gate(spec.run(idx).prerequisites(), |name| {
                spec.run_by_name(name).map(ValidatorRun::severity)
            });
            let name = spec.run(idx).name().to_string();

            if !verdict.is_open() {
                obs::emit_validator_skipped(&name, &verdict.blocking);
                aggregator.record_skipped(&mut spec, idx);
                continue;
            }

            match self.catalog.invoke(&name, map) {
                Ok(issues) => {
                    aggregator.record_executed(&mut spec, idx, issues);
                    let run = spec.run(idx);
                    obs::emit_validator_executed(&name, run.severity(), run.issues().len());
                }
                Err(fault) => {
                    obs::emit_validator_faulted(&name, &fault);
                    match self.config.fault_policy {
                        FaultPolicy::Contain => aggregator.record_faulted(&mut spec, idx, &fault),
                        FaultPolicy::Abort => return Err(LanevalError::ValidatorFault(fault)),
                    }
                }
            }
        }

        aggregator.roll_up(&mut spec);
        let totals = aggregator.totals();
        let requirements_passed = spec.requirements().iter().filter(|r| r.passed()).count();
        obs::emit_validation_finished(&totals, requirements_passed, spec.requirements().len());

        Ok(ValidationReport::new(spec, totals, spec_digest))
    }
}

/// Run every catalog check matching `config.checks_filter`, without
/// requirements or prerequisites. Results are in catalog (name) order.
pub fn validate_map(
    catalog: &ValidatorCatalog,
    map: &LaneletMap,
    config: &ValidationConfig,
    fault_policy: FaultPolicy,
) -> Result<Vec<DetectedIssues>> {
    let mut detected = Vec::new();
    for name in catalog.available_names(config)? {
        let issues = match catalog.invoke(&name, map) {
            Ok(issues) => issues,
            Err(fault) => {
                obs::emit_validator_faulted(&name, &fault);
                match fault_policy {
                    FaultPolicy::Contain => vec![Issue::orchestration(format!(
                        "validator execution failed: {fault}"
                    ))],
                    FaultPolicy::Abort => return Err(LanevalError::ValidatorFault(fault)),
                }
            }
        };
        detected.push(DetectedIssues {
            check_name: name,
            issues,
        });
    }
    Ok(detected)
}
