//! Checks bundled with laneval.
//!
//! These are ordinary [`MapValidator`] implementations; the orchestrator has
//! no special knowledge of them.

mod geometry;
pub mod traffic_light_facing;
pub mod turn_direction_tagging;

use crate::validator::MapValidator;

pub use traffic_light_facing::TrafficLightFacing;
pub use turn_direction_tagging::TurnDirectionTagging;

pub const TURN_DIRECTION_TAGGING: &str = "mapping.intersection.turn_direction_tagging";
pub const TRAFFIC_LIGHT_FACING: &str = "mapping.traffic_light.correct_facing";

/// Every bundled check.
pub fn builtin() -> Vec<Box<dyn MapValidator>> {
    vec![
        Box::new(TurnDirectionTagging),
        Box::new(TrafficLightFacing),
    ]
}
