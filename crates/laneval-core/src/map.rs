//! Read-only lanelet map model.
//!
//! Maps are loaded from a JSON document with one array per layer:
//!
//! ```json
//! {
//!   "points": [{"id": 1, "x": 0.0, "y": 0.0, "z": 0.0}],
//!   "linestrings": [{"id": 10, "points": [1, 2], "attributes": {"type": "stop_line"}}],
//!   "polygons": [],
//!   "lanelets": [{"id": 100, "left": 10, "right": 11, "regulatory_elements": []}],
//!   "regulatory_elements": []
//! }
//! ```
//!
//! Every layer is optional. References between layers are checked on load so
//! that checks can resolve them without further error handling. A linestring
//! needs at least two points to have a direction.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LanevalError, Result};

const MIN_LINESTRING_POINTS: usize = 2;

/// Primitive identifier, unique within a layer.
pub type Id = i64;

/// Free-form `key -> value` tags on a primitive.
pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: Id,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    pub id: Id,
    pub points: Vec<Id>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub id: Id,
    pub points: Vec<Id>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lanelet {
    pub id: Id,
    /// Left bound linestring.
    pub left: Id,
    /// Right bound linestring.
    pub right: Id,
    #[serde(default)]
    pub regulatory_elements: Vec<Id>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryElement {
    pub id: Id,
    /// Linestrings this element refers to (e.g. traffic lights).
    #[serde(default)]
    pub refers: Vec<Id>,
    /// Reference lines (e.g. stop lines).
    #[serde(default)]
    pub ref_lines: Vec<Id>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Something that carries attributes.
pub trait Tagged {
    fn attributes(&self) -> &Attributes;

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes().get(key).map(String::as_str)
    }

    fn has_attribute_value(&self, key: &str, value: &str) -> bool {
        self.attribute(key) == Some(value)
    }
}

impl Tagged for LineString {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl Tagged for Polygon {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl Tagged for Lanelet {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl Tagged for RegulatoryElement {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

#[derive(Debug, Default, Deserialize)]
struct MapDocument {
    #[serde(default)]
    points: Vec<Point>,
    #[serde(default)]
    linestrings: Vec<LineString>,
    #[serde(default)]
    polygons: Vec<Polygon>,
    #[serde(default)]
    lanelets: Vec<Lanelet>,
    #[serde(default)]
    regulatory_elements: Vec<RegulatoryElement>,
}

/// A loaded map. Layers iterate in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct LaneletMap {
    points: BTreeMap<Id, Point>,
    linestrings: BTreeMap<Id, LineString>,
    polygons: BTreeMap<Id, Polygon>,
    lanelets: BTreeMap<Id, Lanelet>,
    regulatory_elements: BTreeMap<Id, RegulatoryElement>,
}

impl LaneletMap {
    /// Load and check a map document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LanevalError::io(path, e))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: MapDocument = serde_json::from_str(content)
            .map_err(|e| LanevalError::InvalidMap(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let document: MapDocument = serde_json::from_value(value)
            .map_err(|e| LanevalError::InvalidMap(e.to_string()))?;
        Self::from_document(document)
    }

    fn from_document(document: MapDocument) -> Result<Self> {
        let map = LaneletMap {
            points: index_layer("point", document.points, |p| p.id)?,
            linestrings: index_layer("linestring", document.linestrings, |l| l.id)?,
            polygons: index_layer("polygon", document.polygons, |p| p.id)?,
            lanelets: index_layer("lanelet", document.lanelets, |l| l.id)?,
            regulatory_elements: index_layer(
                "regulatory element",
                document.regulatory_elements,
                |r| r.id,
            )?,
        };
        map.check_references()?;
        Ok(map)
    }

    fn check_references(&self) -> Result<()> {
        for ls in self.linestrings.values() {
            if ls.points.len() < MIN_LINESTRING_POINTS {
                return Err(LanevalError::InvalidMap(format!(
                    "linestring {} has {} point(s), expected at least {MIN_LINESTRING_POINTS}",
                    ls.id,
                    ls.points.len()
                )));
            }
            require_all("linestring", ls.id, "point", &ls.points, &self.points)?;
        }
        for poly in self.polygons.values() {
            require_all("polygon", poly.id, "point", &poly.points, &self.points)?;
        }
        for ll in self.lanelets.values() {
            require_all(
                "lanelet",
                ll.id,
                "linestring",
                &[ll.left, ll.right],
                &self.linestrings,
            )?;
            require_all(
                "lanelet",
                ll.id,
                "regulatory element",
                &ll.regulatory_elements,
                &self.regulatory_elements,
            )?;
        }
        for re in self.regulatory_elements.values() {
            require_all("regulatory element", re.id, "linestring", &re.refers, &self.linestrings)?;
            require_all(
                "regulatory element",
                re.id,
                "linestring",
                &re.ref_lines,
                &self.linestrings,
            )?;
        }
        Ok(())
    }

    pub fn point(&self, id: Id) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn linestring(&self, id: Id) -> Option<&LineString> {
        self.linestrings.get(&id)
    }

    pub fn regulatory_element(&self, id: Id) -> Option<&RegulatoryElement> {
        self.regulatory_elements.get(&id)
    }

    pub fn linestrings(&self) -> impl Iterator<Item = &LineString> {
        self.linestrings.values()
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.values()
    }

    pub fn lanelets(&self) -> impl Iterator<Item = &Lanelet> {
        self.lanelets.values()
    }

    pub fn regulatory_elements(&self) -> impl Iterator<Item = &RegulatoryElement> {
        self.regulatory_elements.values()
    }

    /// Resolved points of a linestring, in order.
    pub fn linestring_points(&self, linestring: &LineString) -> Vec<Point> {
        linestring
            .points
            .iter()
            .filter_map(|id| self.points.get(id).copied())
            .collect()
    }

    /// Resolved points of a polygon, in order.
    pub fn polygon_points(&self, polygon: &Polygon) -> Vec<Point> {
        polygon
            .points
            .iter()
            .filter_map(|id| self.points.get(id).copied())
            .collect()
    }

    /// Lanelets that list `reg_elem_id` among their regulatory elements.
    pub fn lanelets_referring(&self, reg_elem_id: Id) -> Vec<&Lanelet> {
        self.lanelets
            .values()
            .filter(|ll| ll.regulatory_elements.contains(&reg_elem_id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.linestrings.is_empty()
            && self.polygons.is_empty()
            && self.lanelets.is_empty()
            && self.regulatory_elements.is_empty()
    }
}

fn index_layer<T>(
    layer: &str,
    items: Vec<T>,
    id_of: impl Fn(&T) -> Id,
) -> Result<BTreeMap<Id, T>> {
    let mut indexed = BTreeMap::new();
    for item in items {
        let id = id_of(&item);
        if indexed.insert(id, item).is_some() {
            return Err(LanevalError::InvalidMap(format!(
                "duplicate {layer} id {id}"
            )));
        }
    }
    Ok(indexed)
}

fn require_all<T>(
    owner_kind: &str,
    owner: Id,
    target_kind: &str,
    ids: &[Id],
    layer: &BTreeMap<Id, T>,
) -> Result<()> {
    match ids.iter().find(|id| !layer.contains_key(*id)) {
        Some(missing) => Err(LanevalError::InvalidMap(format!(
            "{owner_kind} {owner} references unknown {target_kind} {missing}"
        ))),
        None => Ok(()),
    }
}
