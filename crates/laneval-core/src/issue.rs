//! Issues emitted by validators and the severity scale they are ranked on.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::map::Id;

/// Severity of an issue, or of a validator run as a whole.
///
/// Ordering is `Error > Warning > Info > None` and is defined by
/// [`Severity::rank`], not by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// No issue at all. Never carried by an [`Issue`].
    None,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Position on the total order.
    pub const fn rank(self) -> u8 {
        match self {
            Severity::None => 0,
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Error => 3,
        }
    }

    /// Highest severity among `issues`, `None` when there are none.
    pub fn max_of<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Severity {
        issues
            .into_iter()
            .map(|issue| issue.severity)
            .max()
            .unwrap_or(Severity::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of map element an issue points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    #[serde(rename = "point")]
    Point,
    #[serde(rename = "linestring")]
    LineString,
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "lanelet")]
    Lanelet,
    #[serde(rename = "area")]
    Area,
    #[serde(rename = "regulatory element")]
    RegulatoryElement,
    /// Not tied to a map element; used for orchestration issues.
    #[serde(rename = "primitive")]
    Primitive,
}

impl Primitive {
    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Point => "point",
            Primitive::LineString => "linestring",
            Primitive::Polygon => "polygon",
            Primitive::Lanelet => "lanelet",
            Primitive::Area => "area",
            Primitive::RegulatoryElement => "regulatory element",
            Primitive::Primitive => "primitive",
        }
    }
}

/// One finding from a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub primitive: Primitive,
    pub id: Id,
    pub message: String,
}

impl Issue {
    fn new(severity: Severity, primitive: Primitive, id: Id, message: impl Into<String>) -> Self {
        Self {
            severity,
            primitive,
            id,
            message: message.into(),
        }
    }

    pub fn error(primitive: Primitive, id: Id, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, primitive, id, message)
    }

    pub fn warning(primitive: Primitive, id: Id, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, primitive, id, message)
    }

    pub fn info(primitive: Primitive, id: Id, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, primitive, id, message)
    }

    /// Error raised by the orchestrator rather than by a check.
    pub(crate) fn orchestration(message: impl Into<String>) -> Self {
        Self::error(Primitive::Primitive, 0, message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.severity,
            self.primitive.as_str(),
            self.id,
            self.message
        )
    }
}

/// Prefix a check message with its issue code, e.g.
/// `[TurnDirectionTagging-001] ...` for `mapping.intersection.turn_direction_tagging`.
pub fn issue_code(check_name: &str, number: u32, message: &str) -> String {
    let last = check_name.rsplit('.').next().unwrap_or(check_name);
    format!("[{}-{:03}] {}", snake_to_upper_camel(last), number, message)
}

/// `turn_direction_tagging` -> `TurnDirectionTagging`.
pub fn snake_to_upper_camel(snake_case: &str) -> String {
    let mut camel = String::with_capacity(snake_case.len());
    let mut capitalize_next = true;
    for ch in snake_case.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            camel.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            camel.push(ch);
        }
    }
    camel
}
