//! Red-yellow-green traffic lights must face the lanes they control.
//!
//! For each traffic-light regulatory element, the start edge of the first
//! referring lanelet (the bound ends closest to the stop line) gives a
//! pseudo stop line. A traffic light linestring drawn in the same direction
//! as that edge is judged correct, the opposite direction wrong.

use std::collections::BTreeMap;

use super::geometry::{direction, Vec3};
use super::TRAFFIC_LIGHT_FACING;
use crate::error::ValidatorFault;
use crate::issue::{issue_code, Issue, Primitive};
use crate::map::{Id, Lanelet, LaneletMap, LineString, Tagged};
use crate::validator::MapValidator;

#[derive(Debug, Clone, Copy, Default)]
struct Judgement {
    correct: bool,
    wrong: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficLightFacing;

impl TrafficLightFacing {
    fn is_red_yellow_green(linestring: &LineString) -> bool {
        linestring.has_attribute_value("type", "traffic_light")
            && linestring.has_attribute_value("subtype", "red_yellow_green")
    }

    fn stop_line<'m>(map: &'m LaneletMap, ref_lines: &[Id]) -> Option<&'m LineString> {
        ref_lines
            .iter()
            .filter_map(|&id| map.linestring(id))
            .find(|ls| ls.has_attribute_value("type", "stop_line"))
    }

    /// Direction of the lanelet's start edge, left bound end to right bound
    /// end. Picks whichever end (front or back) lies closer to `reference`;
    /// without a reference the front end is used.
    fn start_edge(map: &LaneletMap, lanelet: &Lanelet, reference: Option<&LineString>) -> Option<Vec3> {
        let left = map.linestring_points(map.linestring(lanelet.left)?);
        let right = map.linestring_points(map.linestring(lanelet.right)?);
        let front_l = Vec3::from_point(left.first()?);
        let back_l = Vec3::from_point(left.last()?);
        let front_r = Vec3::from_point(right.first()?);
        let back_r = Vec3::from_point(right.last()?);

        let use_front = match reference.map(|ls| map.linestring_points(ls)) {
            Some(ref_points) if !ref_points.is_empty() => {
                let ref_1 = Vec3::from_point(&ref_points[0]);
                let ref_2 = Vec3::from_point(&ref_points[ref_points.len() - 1]);
                let norm_sum = |a: Vec3, b: Vec3| a.sub(ref_1).norm() + b.sub(ref_2).norm();
                let front_min = norm_sum(front_l, front_r).min(norm_sum(front_r, front_l));
                let back_min = norm_sum(back_l, back_r).min(norm_sum(back_r, back_l));
                front_min <= back_min
            }
            _ => true,
        };

        Some(if use_front {
            front_r.sub(front_l)
        } else {
            back_r.sub(back_l)
        })
    }

    fn code(&self, number: u32, message: &str) -> String {
        issue_code(self.name(), number, message)
    }
}

impl MapValidator for TrafficLightFacing {
    fn name(&self) -> &str {
        TRAFFIC_LIGHT_FACING
    }

    fn run(&self, map: &LaneletMap) -> Result<Vec<Issue>, ValidatorFault> {
        let mut issues = Vec::new();
        let mut judgements: BTreeMap<Id, Judgement> = map
            .linestrings()
            .filter(|ls| Self::is_red_yellow_green(ls))
            .map(|ls| (ls.id, Judgement::default()))
            .collect();

        let traffic_light_elements = map
            .regulatory_elements()
            .filter(|re| re.has_attribute_value("subtype", "traffic_light"));

        for reg_elem in traffic_light_elements {
            let stop_line = Self::stop_line(map, &reg_elem.ref_lines);
            let referring = map.lanelets_referring(reg_elem.id);

            for light in reg_elem
                .refers
                .iter()
                .filter_map(|&id| map.linestring(id))
                .filter(|ls| Self::is_red_yellow_green(ls))
            {
                let Some((first, rest)) = referring.split_first() else {
                    issues.push(Issue::warning(
                        Primitive::LineString,
                        light.id,
                        self.code(
                            1,
                            "Regulatory element of traffic light must be referred by at least one lanelet.",
                        ),
                    ));
                    continue;
                };

                let Some(pseudo_stop_line) = Self::start_edge(map, first, stop_line) else {
                    continue;
                };

                let divergent = rest.iter().any(|lanelet| {
                    Self::start_edge(map, lanelet, stop_line)
                        .and_then(|edge| pseudo_stop_line.cosine(edge))
                        .is_some_and(|cos| cos < 0.0)
                });
                if divergent {
                    issues.push(Issue::warning(
                        Primitive::LineString,
                        light.id,
                        self.code(
                            2,
                            "Lanelets referring this traffic_light have several divergent starting points.",
                        ),
                    ));
                }

                let facing = direction(&map.linestring_points(light))
                    .and_then(|tl| pseudo_stop_line.cosine(tl));
                let judgement = judgements.entry(light.id).or_default();
                match facing {
                    Some(cos) if cos > 0.0 => judgement.correct = true,
                    _ => judgement.wrong = true,
                }
            }
        }

        for (id, judgement) in judgements {
            match (judgement.correct, judgement.wrong) {
                (false, false) => issues.push(Issue::error(
                    Primitive::LineString,
                    id,
                    self.code(
                        3,
                        "This traffic light is not referred by any traffic light regulatory element.",
                    ),
                )),
                (false, true) => issues.push(Issue::error(
                    Primitive::LineString,
                    id,
                    self.code(4, "The linestring direction seems to be wrong."),
                )),
                (true, true) => issues.push(Issue::warning(
                    Primitive::LineString,
                    id,
                    self.code(
                        5,
                        "The linestring direction has been judged as both correct and wrong.",
                    ),
                )),
                (true, false) => {}
            }
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;
    use serde_json::json;

    /// A lanelet running north between x=0 and x=3, a stop line across its
    /// far end at y=10, and a traffic light beyond it at y=20.
    fn map(light_points: [i64; 2], refer_from_lanelet: bool) -> LaneletMap {
        let reg_elems: Vec<i64> = if refer_from_lanelet { vec![50] } else { vec![] };
        LaneletMap::from_value(json!({
            "points": [
                {"id": 1, "x": 0.0, "y": 0.0}, {"id": 2, "x": 0.0, "y": 10.0},
                {"id": 3, "x": 3.0, "y": 0.0}, {"id": 4, "x": 3.0, "y": 10.0},
                {"id": 5, "x": 0.0, "y": 10.0}, {"id": 6, "x": 3.0, "y": 10.0},
                {"id": 7, "x": 0.0, "y": 20.0, "z": 5.0}, {"id": 8, "x": 3.0, "y": 20.0, "z": 5.0}
            ],
            "linestrings": [
                {"id": 10, "points": [1, 2]},
                {"id": 11, "points": [3, 4]},
                {"id": 12, "points": [5, 6], "attributes": {"type": "stop_line"}},
                {"id": 13, "points": light_points,
                 "attributes": {"type": "traffic_light", "subtype": "red_yellow_green"}}
            ],
            "regulatory_elements": [
                {"id": 50, "refers": [13], "ref_lines": [12],
                 "attributes": {"subtype": "traffic_light"}}
            ],
            "lanelets": [
                {"id": 100, "left": 10, "right": 11, "regulatory_elements": reg_elems}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_correctly_facing_light_passes() {
        let issues = TrafficLightFacing.run(&map([7, 8], true)).unwrap();
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_reversed_light_is_error() {
        let issues = TrafficLightFacing.run(&map([8, 7], true)).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].id, 13);
        assert!(issues[0].message.contains("seems to be wrong"));
    }

    #[test]
    fn test_lanelet_with_empty_bounds_never_reaches_the_check() {
        let err = LaneletMap::from_value(json!({
            "points": [{"id": 7, "x": 0.0, "y": 20.0}, {"id": 8, "x": 3.0, "y": 20.0}],
            "linestrings": [
                {"id": 10, "points": []},
                {"id": 11, "points": []},
                {"id": 13, "points": [7, 8],
                 "attributes": {"type": "traffic_light", "subtype": "red_yellow_green"}}
            ],
            "regulatory_elements": [
                {"id": 50, "refers": [13], "attributes": {"subtype": "traffic_light"}}
            ],
            "lanelets": [
                {"id": 100, "left": 10, "right": 11, "regulatory_elements": [50]}
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("linestring 10"));
    }

    #[test]
    fn test_unreferred_element_warns_and_light_is_unjudged() {
        let issues = TrafficLightFacing.run(&map([7, 8], false)).unwrap();
        let severities: Vec<Severity> = issues.iter().map(|i| i.severity).collect();
        assert_eq!(severities, vec![Severity::Warning, Severity::Error]);
        assert!(issues[0].message.starts_with("[CorrectFacing-001]"));
        assert!(issues[1].message.starts_with("[CorrectFacing-003]"));
    }
}
