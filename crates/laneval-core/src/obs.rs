//! Structured lifecycle events for a validation pass.
//!
//! All events carry an `event` field so log pipelines can select them
//! without parsing messages. Verbosity follows `RUST_LOG`.

use tracing::{debug, info, warn};

use crate::aggregator::IssueTotals;
use crate::issue::Severity;

/// RAII guard for a span covering one validation pass.
pub struct ValidationSpan {
    _span: tracing::span::EnteredSpan,
}

impl ValidationSpan {
    /// Enter a span tagged with the spec digest.
    pub fn enter(spec_digest: &str) -> Self {
        let span = tracing::info_span!("laneval.validation", spec_digest = %spec_digest);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_validation_started(spec_digest: &str, requirements: usize, validators: usize) {
    info!(
        event = "validation.started",
        spec_digest = %spec_digest,
        requirements = requirements,
        validators = validators,
    );
}

pub fn emit_validator_executed(name: &str, severity: Severity, issues: usize) {
    info!(
        event = "validator.executed",
        validator = %name,
        severity = %severity,
        issues = issues,
    );
}

pub fn emit_validator_skipped(name: &str, blocking: &[String]) {
    warn!(event = "validator.skipped", validator = %name, blocking = ?blocking);
}

pub fn emit_validator_excluded(name: &str, unresolved: &[String]) {
    warn!(event = "validator.excluded", validator = %name);
    if !unresolved.is_empty() {
        debug!(
            event = "validator.unresolved_prerequisites",
            validator = %name,
            unresolved = ?unresolved,
        );
    }
}

pub fn emit_validator_faulted(name: &str, error: &dyn std::fmt::Display) {
    warn!(event = "validator.faulted", validator = %name, error = %error);
}

pub fn emit_validation_finished(
    totals: &IssueTotals,
    requirements_passed: usize,
    requirements: usize,
) {
    info!(
        event = "validation.finished",
        errors = totals.errors,
        warnings = totals.warnings,
        infos = totals.infos,
        requirements_passed = requirements_passed,
        requirements = requirements,
    );
}
