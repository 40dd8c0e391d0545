//! Lanelets inside an intersection area must be tagged with a turn direction.

use std::collections::BTreeSet;

use super::geometry::BoundingBox2d;
use super::TURN_DIRECTION_TAGGING;
use crate::error::ValidatorFault;
use crate::issue::{issue_code, Issue, Primitive};
use crate::map::{Id, Lanelet, LaneletMap, Point, Tagged};
use crate::validator::MapValidator;

const TURN_DIRECTIONS: [&str; 3] = ["left", "straight", "right"];

/// Every lanelet lying within the 2D bounding box of an
/// `intersection_area` polygon needs `turn_direction` set to one of
/// `left`, `straight` or `right`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnDirectionTagging;

impl TurnDirectionTagging {
    fn bound_points(map: &LaneletMap, lanelet: &Lanelet) -> Vec<Point> {
        [lanelet.left, lanelet.right]
            .iter()
            .filter_map(|&id| map.linestring(id))
            .flat_map(|ls| map.linestring_points(ls))
            .collect()
    }
}

impl MapValidator for TurnDirectionTagging {
    fn name(&self) -> &str {
        TURN_DIRECTION_TAGGING
    }

    fn run(&self, map: &LaneletMap) -> Result<Vec<Issue>, ValidatorFault> {
        let mut issues = Vec::new();
        let mut checked: BTreeSet<Id> = BTreeSet::new();

        let areas = map
            .polygons()
            .filter(|poly| poly.has_attribute_value("type", "intersection_area"));

        for area in areas {
            let Some(bbox) = BoundingBox2d::of(&map.polygon_points(area)) else {
                continue;
            };

            for lanelet in map.lanelets() {
                if checked.contains(&lanelet.id) {
                    continue;
                }
                let points = Self::bound_points(map, lanelet);
                if points.is_empty() || !points.iter().all(|p| bbox.contains(p)) {
                    continue;
                }
                checked.insert(lanelet.id);

                match lanelet.attribute("turn_direction") {
                    None => issues.push(Issue::error(
                        Primitive::Lanelet,
                        lanelet.id,
                        issue_code(self.name(), 1, "This lanelet is missing a turn_direction tag."),
                    )),
                    Some(direction) if !TURN_DIRECTIONS.contains(&direction) => {
                        issues.push(Issue::error(
                            Primitive::Lanelet,
                            lanelet.id,
                            issue_code(
                                self.name(),
                                2,
                                &format!("Invalid turn_direction tag ({direction}) is found."),
                            ),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// One intersection area spanning (0,0)-(10,10) and three lanelets:
    /// 100 inside, tagged with `turn_direction`; 101 inside, untagged;
    /// 102 reaching outside the area.
    fn map_with(turn_direction_100: serde_json::Value) -> LaneletMap {
        LaneletMap::from_value(json!({
            "points": [
                {"id": 1, "x": 0.0, "y": 0.0}, {"id": 2, "x": 10.0, "y": 0.0},
                {"id": 3, "x": 10.0, "y": 10.0}, {"id": 4, "x": 0.0, "y": 10.0},
                {"id": 11, "x": 1.0, "y": 1.0}, {"id": 12, "x": 1.0, "y": 9.0},
                {"id": 13, "x": 3.0, "y": 1.0}, {"id": 14, "x": 3.0, "y": 9.0},
                {"id": 21, "x": 5.0, "y": 1.0}, {"id": 22, "x": 5.0, "y": 20.0}
            ],
            "polygons": [
                {"id": 500, "points": [1, 2, 3, 4], "attributes": {"type": "intersection_area"}}
            ],
            "linestrings": [
                {"id": 31, "points": [11, 12]},
                {"id": 32, "points": [13, 14]},
                {"id": 33, "points": [21, 22]}
            ],
            "lanelets": [
                {"id": 100, "left": 31, "right": 32, "attributes": turn_direction_100},
                {"id": 101, "left": 31, "right": 32},
                {"id": 102, "left": 32, "right": 33}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_tag_inside_area_is_error() {
        let issues = TurnDirectionTagging
            .run(&map_with(json!({"turn_direction": "left"})))
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, 101);
        assert!(issues[0]
            .message
            .starts_with("[TurnDirectionTagging-001]"));
    }

    #[test]
    fn test_invalid_tag_value_is_error() {
        let issues = TurnDirectionTagging
            .run(&map_with(json!({"turn_direction": "sideways"})))
            .unwrap();
        let codes: Vec<&str> = issues.iter().map(|i| &i.message[..26]).collect();
        assert!(codes.contains(&"[TurnDirectionTagging-002]"));
        assert!(issues.iter().any(|i| i.message.contains("sideways")));
    }

    #[test]
    fn test_lanelet_outside_area_is_ignored() {
        let issues = TurnDirectionTagging
            .run(&map_with(json!({"turn_direction": "straight"})))
            .unwrap();
        assert!(issues.iter().all(|i| i.id != 102));
    }

    #[test]
    fn test_map_without_areas_passes() {
        let issues = TurnDirectionTagging.run(&LaneletMap::default()).unwrap();
        assert!(issues.is_empty());
    }
}
