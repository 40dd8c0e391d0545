//! laneval core library
//!
//! Requirement-driven validation of lanelet maps: parse a requirement set,
//! order its checks by their prerequisites, gate each check on the outcome
//! of the checks it depends on, and aggregate the results into a report.

pub mod aggregator;
pub mod checks;
pub mod error;
pub mod gate;
pub mod graph;
pub mod issue;
pub mod map;
pub mod obs;
pub mod orchestrator;
pub mod report;
pub mod spec;
pub mod telemetry;
pub mod validator;

pub use aggregator::{IssueTotals, ResultAggregator, EXCLUDED_MESSAGE};
pub use error::{LanevalError, Result, ValidatorFault};
pub use gate::{evaluate_gate, GateVerdict, GATE_CLOSED_MESSAGE};
pub use graph::{DependencyGraph, Schedule};
pub use issue::{issue_code, Issue, Primitive, Severity};
pub use map::{Id, LaneletMap};
pub use orchestrator::{validate_map, FaultPolicy, OrchestratorConfig, RequirementOrchestrator};
pub use report::{
    detected_totals, render_detected_issues, DetectedIssues, ValidationReport, OUTPUT_FILE_NAME,
};
pub use spec::{PrerequisiteEdge, Requirement, RequirementSpec, RunIndex, RunOutcome, ValidatorRun};
pub use telemetry::init_tracing;
pub use validator::{MapValidator, ValidationConfig, ValidatorCatalog};

/// laneval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
