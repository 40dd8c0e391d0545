//! Requirement specification model.
//!
//! A requirement spec groups validators into named requirements:
//!
//! ```json
//! {
//!   "requirements": [
//!     {
//!       "id": "traffic-lights",
//!       "validators": [
//!         {"name": "mapping.traffic_light.correct_facing",
//!          "prerequisites": [{"name": "mapping.lanelet.bounds", "forgive_warnings": true}]}
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Validator names form one global namespace. A name listed under several
//! requirements is a single [`ValidatorRun`] shared by all of them, so it is
//! executed once and its outcome reported everywhere it appears.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{LanevalError, Result};
use crate::issue::{Issue, Severity};

/// Index of a [`ValidatorRun`] inside a [`RequirementSpec`].
pub type RunIndex = usize;

// ── input document ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpecDocument {
    requirements: Vec<RequirementDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RequirementDecl {
    id: String,
    validators: Vec<ValidatorDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ValidatorDecl {
    name: String,
    #[serde(default)]
    prerequisites: Vec<PrerequisiteDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrerequisiteDecl {
    name: String,
    #[serde(default)]
    forgive_warnings: bool,
}

// ── runtime model ─────────────────────────────────────────────────────────

/// `owner` requires `target` to have cleared before it may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    pub target: String,
    /// A WARNING on the target does not block when set. ERROR always blocks.
    pub forgive_warnings: bool,
}

/// How a run was finalized during the orchestration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The check was invoked and its issues recorded.
    Executed,
    /// A prerequisite did not clear; the check was not invoked.
    Skipped,
    /// Cyclic or dangling prerequisites; never scheduled.
    Excluded,
    /// The check was invoked but could not produce a result.
    Faulted,
}

/// One named validator and, once finalized, its outcome.
#[derive(Debug, Clone)]
pub struct ValidatorRun {
    name: String,
    prerequisites: Vec<PrerequisiteEdge>,
    pub(crate) severity: Severity,
    pub(crate) passed: bool,
    pub(crate) issues: Vec<Issue>,
    pub(crate) outcome: Option<RunOutcome>,
}

impl ValidatorRun {
    fn new(name: String) -> Self {
        Self {
            name,
            prerequisites: Vec::new(),
            severity: Severity::None,
            passed: false,
            issues: Vec::new(),
            outcome: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prerequisites(&self) -> &[PrerequisiteEdge] {
        &self.prerequisites
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// True iff the run executed and produced no issues.
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// `None` until the orchestration pass reaches this run.
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Merge an edge declared by another reference to the same name.
    fn merge_edge(&mut self, edge: PrerequisiteEdge) {
        match self
            .prerequisites
            .iter_mut()
            .find(|existing| existing.target == edge.target)
        {
            Some(existing) => {
                existing.forgive_warnings = existing.forgive_warnings && edge.forgive_warnings
            }
            None => self.prerequisites.push(edge),
        }
    }
}

/// A named group of validators reported as one unit.
#[derive(Debug, Clone)]
pub struct Requirement {
    id: String,
    validators: Vec<RunIndex>,
    pub(crate) passed: bool,
}

impl Requirement {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Indices of this requirement's runs, in declaration order.
    pub fn validators(&self) -> &[RunIndex] {
        &self.validators
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

/// Parsed requirement spec: requirements plus the arena of shared runs.
#[derive(Debug, Clone)]
pub struct RequirementSpec {
    requirements: Vec<Requirement>,
    runs: Vec<ValidatorRun>,
    by_name: HashMap<String, RunIndex>,
    /// Input document as given, used to mirror it in the output document.
    raw: Value,
}

impl RequirementSpec {
    /// Read and parse a requirement spec file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LanevalError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(content)
            .map_err(|e| LanevalError::InvalidSpec(e.to_string()))?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: Value) -> Result<Self> {
        let document: SpecDocument = serde_json::from_value(raw.clone())
            .map_err(|e| LanevalError::InvalidSpec(e.to_string()))?;

        let mut requirements = Vec::with_capacity(document.requirements.len());
        let mut runs: Vec<ValidatorRun> = Vec::new();
        let mut by_name: HashMap<String, RunIndex> = HashMap::new();
        let mut seen_ids = HashSet::new();

        for decl in document.requirements {
            if decl.id.trim().is_empty() {
                return Err(LanevalError::InvalidSpec(
                    "requirement id must not be empty".to_string(),
                ));
            }
            if !seen_ids.insert(decl.id.clone()) {
                return Err(LanevalError::InvalidSpec(format!(
                    "duplicate requirement id '{}'",
                    decl.id
                )));
            }

            let mut validators = Vec::with_capacity(decl.validators.len());
            for v in decl.validators {
                if v.name.trim().is_empty() {
                    return Err(LanevalError::InvalidSpec(format!(
                        "requirement '{}' has a validator with an empty name",
                        decl.id
                    )));
                }
                let idx = *by_name.entry(v.name.clone()).or_insert_with(|| {
                    runs.push(ValidatorRun::new(v.name.clone()));
                    runs.len() - 1
                });
                for p in v.prerequisites {
                    if p.name.trim().is_empty() {
                        return Err(LanevalError::InvalidSpec(format!(
                            "validator '{}' has a prerequisite with an empty name",
                            v.name
                        )));
                    }
                    runs[idx].merge_edge(PrerequisiteEdge {
                        target: p.name,
                        forgive_warnings: p.forgive_warnings,
                    });
                }
                validators.push(idx);
            }

            requirements.push(Requirement {
                id: decl.id,
                validators,
                passed: false,
            });
        }

        Ok(Self {
            requirements,
            runs,
            by_name,
            raw,
        })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// All runs in first-declaration order.
    pub fn runs(&self) -> &[ValidatorRun] {
        &self.runs
    }

    pub fn run(&self, index: RunIndex) -> &ValidatorRun {
        &self.runs[index]
    }

    pub(crate) fn run_mut(&mut self, index: RunIndex) -> &mut ValidatorRun {
        &mut self.runs[index]
    }

    pub(crate) fn requirements_mut(&mut self) -> &mut [Requirement] {
        &mut self.requirements
    }

    pub fn run_by_name(&self, name: &str) -> Option<&ValidatorRun> {
        self.index_of(name).map(|idx| &self.runs[idx])
    }

    pub fn index_of(&self, name: &str) -> Option<RunIndex> {
        self.by_name.get(name).copied()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Deterministic SHA-256 over requirement ids, validator names and
    /// prerequisite edges, in declaration order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for req in &self.requirements {
            hasher.update(b"R");
            hasher.update(req.id.as_bytes());
            hasher.update(b"\0");
            for &idx in &req.validators {
                let run = &self.runs[idx];
                hasher.update(b"V");
                hasher.update(run.name.as_bytes());
                hasher.update(b"\0");
                for edge in &run.prerequisites {
                    hasher.update(b"P");
                    hasher.update(edge.target.as_bytes());
                    hasher.update(if edge.forgive_warnings { b"\x01" } else { b"\x00" });
                }
            }
        }
        hex::encode(hasher.finalize())
    }
}
