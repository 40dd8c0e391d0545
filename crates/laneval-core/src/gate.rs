//! Prerequisite gate evaluation.
//!
//! Called for a run immediately before its turn in the topological order,
//! when every prerequisite already holds its final severity.

use serde::{Deserialize, Serialize};

use crate::issue::Severity;
use crate::spec::PrerequisiteEdge;

/// Message of the issue attached to a run whose gate is closed.
pub const GATE_CLOSED_MESSAGE: &str = "prerequisites did not pass";

/// Gate decision for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Whether the run may execute.
    pub open: bool,

    /// Prerequisites that closed the gate (empty if open).
    pub blocking: Vec<String>,
}

impl GateVerdict {
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Whether a prerequisite at `severity` blocks its dependent over `edge`.
///
/// ERROR always blocks. WARNING blocks unless the edge forgives warnings.
/// INFO and NONE never block.
pub fn edge_blocks(edge: &PrerequisiteEdge, severity: Severity) -> bool {
    match severity {
        Severity::Error => true,
        Severity::Warning => !edge.forgive_warnings,
        Severity::Info | Severity::None => false,
    }
}

/// Evaluate the gate for a run.
///
/// `severity_of` returns the finalized severity of a prerequisite by name.
/// A name it cannot resolve is treated as ERROR; the scheduler excludes such
/// runs before they reach the gate.
pub fn evaluate_gate<F>(prerequisites: &[PrerequisiteEdge], severity_of: F) -> GateVerdict
where
    F: Fn(&str) -> Option<Severity>,
{
    let blocking: Vec<String> = prerequisites
        .iter()
        .filter(|edge| {
            let severity = severity_of(&edge.target).unwrap_or(Severity::Error);
            edge_blocks(edge, severity)
        })
        .map(|edge| edge.target.clone())
        .collect();

    GateVerdict {
        open: blocking.is_empty(),
        blocking,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn edge(target: &str, forgive_warnings: bool) -> PrerequisiteEdge {
        PrerequisiteEdge {
            target: target.to_string(),
            forgive_warnings,
        }
    }

    fn lookup(pairs: &[(&str, Severity)]) -> impl Fn(&str) -> Option<Severity> {
        let table: HashMap<String, Severity> =
            pairs.iter().map(|(n, s)| (n.to_string(), *s)).collect();
        move |name| table.get(name).copied()
    }

    #[test]
    fn test_no_prerequisites_is_open() {
        let verdict = evaluate_gate(&[], lookup(&[]));
        assert!(verdict.is_open());
        assert!(verdict.blocking.is_empty());
    }

    #[test]
    fn test_error_blocks_even_when_forgiving() {
        let verdict = evaluate_gate(&[edge("Y", true)], lookup(&[("Y", Severity::Error)]));
        assert!(!verdict.is_open());
        assert_eq!(verdict.blocking, vec!["Y"]);
    }

    #[test]
    fn test_warning_blocks_without_forgiveness() {
        let verdict = evaluate_gate(&[edge("Y", false)], lookup(&[("Y", Severity::Warning)]));
        assert!(!verdict.is_open());
    }

    #[test]
    fn test_warning_forgiven_on_edge() {
        let verdict = evaluate_gate(&[edge("Y", true)], lookup(&[("Y", Severity::Warning)]));
        assert!(verdict.is_open());
    }

    #[test]
    fn test_info_and_none_never_block() {
        let verdict = evaluate_gate(
            &[edge("I", false), edge("N", false)],
            lookup(&[("I", Severity::Info), ("N", Severity::None)]),
        );
        assert!(verdict.is_open());
    }

    #[test]
    fn test_forgiveness_is_per_edge() {
        let verdict = evaluate_gate(
            &[edge("W1", true), edge("W2", false)],
            lookup(&[("W1", Severity::Warning), ("W2", Severity::Warning)]),
        );
        assert!(!verdict.is_open());
        assert_eq!(verdict.blocking, vec!["W2"]);
    }

    #[test]
    fn test_unknown_prerequisite_blocks() {
        let verdict = evaluate_gate(&[edge("ghost", true)], lookup(&[]));
        assert!(!verdict.is_open());
    }
}
