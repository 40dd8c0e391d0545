//! Validation reports: console summary, output document and exit status.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregator::IssueTotals;
use crate::error::{LanevalError, Result};
use crate::issue::Issue;
use crate::spec::RequirementSpec;

/// File name of the output document inside the output directory.
pub const OUTPUT_FILE_NAME: &str = "lanelet2_validation_results.json";

const NO_ISSUES_LINE: &str = "No issues were found.";

fn verdict(passed: bool) -> &'static str {
    if passed {
        "Passed"
    } else {
        "Failed"
    }
}

fn render_totals(out: &mut String, totals: &IssueTotals) {
    if totals.is_clean() {
        out.push_str(NO_ISSUES_LINE);
        out.push('\n');
    } else {
        let _ = writeln!(out, "Total warnings: {}", totals.warnings);
        let _ = writeln!(out, "Total errors: {}", totals.errors);
    }
}

/// Finalized result of one requirement orchestration pass.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    spec: RequirementSpec,
    totals: IssueTotals,
    spec_digest: String,
}

impl ValidationReport {
    pub(crate) fn new(spec: RequirementSpec, totals: IssueTotals, spec_digest: String) -> Self {
        Self {
            spec,
            totals,
            spec_digest,
        }
    }

    pub fn spec(&self) -> &RequirementSpec {
        &self.spec
    }

    pub fn totals(&self) -> IssueTotals {
        self.totals
    }

    pub fn spec_digest(&self) -> &str {
        &self.spec_digest
    }

    /// Whether the process should exit successfully: no warnings and no
    /// errors across the pass.
    pub fn is_success(&self) -> bool {
        self.totals.is_clean()
    }

    /// Whether every requirement passed.
    pub fn all_requirements_passed(&self) -> bool {
        self.spec.requirements().iter().all(|r| r.passed())
    }

    /// Console summary.
    ///
    /// ```text
    /// [R1] Failed
    ///   - A: Failed
    ///   - B: Failed
    /// Total warnings: 1
    /// Total errors: 1
    /// ```
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        for req in self.spec.requirements() {
            let _ = writeln!(out, "[{}] {}", req.id(), verdict(req.passed()));
            for &idx in req.validators() {
                let run = self.spec.run(idx);
                let _ = writeln!(out, "  - {}: {}", run.name(), verdict(run.passed()));
            }
        }
        render_totals(&mut out, &self.totals);
        out
    }

    /// The input document annotated with `passed` on every requirement and
    /// `passed` plus `issues` on every validator entry. Fields of the input
    /// that laneval does not interpret are kept as given.
    pub fn to_output_document(&self) -> Result<Value> {
        let mut document = self.spec.raw().clone();
        let Some(requirements) = document
            .get_mut("requirements")
            .and_then(Value::as_array_mut)
        else {
            return Err(LanevalError::InvalidSpec(
                "'requirements' is not an array".to_string(),
            ));
        };

        for (req_value, req) in requirements.iter_mut().zip(self.spec.requirements()) {
            let Some(req_obj) = req_value.as_object_mut() else {
                continue;
            };
            req_obj.insert("passed".to_string(), Value::Bool(req.passed()));

            let Some(validators) = req_obj.get_mut("validators").and_then(Value::as_array_mut)
            else {
                continue;
            };
            for (val_value, &idx) in validators.iter_mut().zip(req.validators()) {
                let run = self.spec.run(idx);
                if let Some(val_obj) = val_value.as_object_mut() {
                    val_obj.insert("passed".to_string(), Value::Bool(run.passed()));
                    val_obj.insert("issues".to_string(), serde_json::to_value(run.issues())?);
                }
            }
        }
        Ok(document)
    }

    /// Write the output document to `<dir>/lanelet2_validation_results.json`,
    /// creating `dir` if needed. Returns the written path.
    pub fn write_output(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| LanevalError::io(dir, e))?;
        let path = dir.join(OUTPUT_FILE_NAME);
        let mut content = serde_json::to_string_pretty(&self.to_output_document()?)?;
        content.push('\n');
        std::fs::write(&path, content).map_err(|e| LanevalError::io(&path, e))?;
        Ok(path)
    }
}

/// Issues found by one check in direct (non-requirement) mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedIssues {
    pub check_name: String,
    pub issues: Vec<Issue>,
}

/// Totals over a direct-mode run.
pub fn detected_totals(detected: &[DetectedIssues]) -> IssueTotals {
    let mut totals = IssueTotals::default();
    for d in detected {
        totals.add(&d.issues);
    }
    totals
}

/// Console listing of every issue found in direct mode, grouped by check.
pub fn render_detected_issues(detected: &[DetectedIssues]) -> String {
    let mut out = String::new();
    for d in detected.iter().filter(|d| !d.issues.is_empty()) {
        let _ = writeln!(out, "{}:", d.check_name);
        for issue in &d.issues {
            let _ = writeln!(out, "  {issue}");
        }
    }
    render_totals(&mut out, &detected_totals(detected));
    out
}
