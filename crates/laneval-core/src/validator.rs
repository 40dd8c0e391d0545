//! Validator capability and catalog.
//!
//! A check is anything implementing [`MapValidator`]. The orchestrator only
//! sees checks through a [`ValidatorCatalog`] it is handed; there is no
//! global registry.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use regex::Regex;

use crate::checks;
use crate::error::{LanevalError, Result, ValidatorFault};
use crate::issue::Issue;
use crate::map::LaneletMap;

/// A named, pluggable map check.
pub trait MapValidator: Send + Sync {
    /// Catalog name, e.g. `mapping.intersection.turn_direction_tagging`.
    fn name(&self) -> &str;

    /// Inspect `map` and report findings. An empty vector means pass.
    fn run(&self, map: &LaneletMap) -> std::result::Result<Vec<Issue>, ValidatorFault>;
}

/// Options for direct (non-requirement) validation and catalog listing.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Regex selecting checks by name. Empty or `None` selects every check.
    pub checks_filter: Option<String>,
}

impl ValidationConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            checks_filter: Some(filter.into()),
        }
    }

    fn compiled_filter(&self) -> Result<Option<Regex>> {
        match self.checks_filter.as_deref() {
            None | Some("") => Ok(None),
            Some(pattern) => Regex::new(pattern)
                .map(Some)
                .map_err(|source| LanevalError::InvalidFilter {
                    pattern: pattern.to_string(),
                    source,
                }),
        }
    }
}

/// Name → implementation mapping handed to the orchestrator.
#[derive(Default)]
pub struct ValidatorCatalog {
    validators: BTreeMap<String, Box<dyn MapValidator>>,
}

impl ValidatorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the checks bundled with laneval.
    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        for validator in checks::builtin() {
            catalog.register(validator);
        }
        catalog
    }

    /// Register a check. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, validator: Box<dyn MapValidator>) {
        self.validators
            .insert(validator.name().to_string(), validator);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run the check registered under exactly `name`.
    ///
    /// A panic inside the check is caught and returned as
    /// [`ValidatorFault::Failed`].
    pub fn invoke(
        &self,
        name: &str,
        map: &LaneletMap,
    ) -> std::result::Result<Vec<Issue>, ValidatorFault> {
        let Some(validator) = self.validators.get(name) else {
            return Err(ValidatorFault::NotRegistered {
                name: name.to_string(),
            });
        };
        // The map is only read and the catalog holds no state to poison.
        panic::catch_unwind(AssertUnwindSafe(|| validator.run(map))).unwrap_or_else(|payload| {
            Err(ValidatorFault::Failed {
                name: name.to_string(),
                reason: format!("panicked: {}", panic_message(payload.as_ref())),
            })
        })
    }

    /// Sorted names matching `config.checks_filter`.
    pub fn available_names(&self, config: &ValidationConfig) -> Result<Vec<String>> {
        let filter = config.compiled_filter()?;
        Ok(self
            .validators
            .keys()
            .filter(|name| filter.as_ref().map_or(true, |re| re.is_match(name)))
            .cloned()
            .collect())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic payload"
    }
}

impl std::fmt::Debug for ValidatorCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorCatalog")
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}
