//! Tunable parameters of the simulation.
//!
//! The car-following multipliers in [FollowingParams] are one reasonable
//! parameterization of the speed model rather than settled constants, so they
//! are exposed here instead of being hard-coded.

use crate::math::Point;
use crate::path::RoadCondition;
use crate::util::Interval;

/// Top-level configuration of a [Simulation](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Traffic light phase durations.
    pub lights: LightTiming,
    /// Multipliers of the car-following model.
    pub following: FollowingParams,
    /// Geometry and limits of the network and its synthetic segments.
    pub network: NetworkParams,
    /// Ranges used when agent parameters are randomized.
    pub ranges: AttributeRanges,
    /// The maximum number of segments an agent may enter within one tick.
    /// Exceeding it means the network contains a cycle of near-zero length segments.
    pub max_overflow_steps: usize,
}

/// Durations of the traffic light phases, in ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightTiming {
    /// The range from which each junction draws its cycle length.
    pub cycle_ticks: Interval<u32>,
    /// Duration of the all-red phase after pedestrians had green.
    pub pedestrian_red_ticks: u32,
    /// Duration of the all-red phase after a road had green.
    pub driver_red_ticks: u32,
}

/// Multipliers of the braking-distance proxy used by the car-following model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowingParams {
    /// A driver accelerates freely while the junction is further away
    /// than this many braking distances.
    pub free_approach_factor: u32,
    /// A driver facing a red light starts braking once the junction is
    /// closer than this many braking distances.
    pub junction_brake_factor: u32,
    /// A driver accelerates while the gap to the vehicle ahead exceeds
    /// this many braking distances (plus its minimum following distance).
    pub follow_accelerate_factor: u32,
    /// A driver brakes once the gap to the vehicle ahead falls under
    /// this many braking distances (plus its minimum following distance).
    pub follow_brake_factor: u32,
}

/// Geometry and limits of the network.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkParams {
    /// Speed limit inside junctions and on the crossing roads through them.
    pub junction_speed_limit: u32,
    /// Length of the synthetic segments used to cross a junction.
    pub crossing_length: u32,
    /// Surface of the synthetic crossing roads.
    pub crossing_condition: RoadCondition,
    /// Lateral offset of roads from the junction centres.
    pub road_offset: i16,
    /// Lateral offset of pavements from the junction centres.
    pub pavement_offset: i16,
    /// Position of the junction every agent spawns towards.
    pub base_junction_position: Point,
    /// Start point of the spawn road and pavement.
    pub spawn_origin: Point,
    /// Length of the spawn road and pavement.
    pub spawn_length: u32,
    /// Speed limit of the spawn road.
    pub spawn_speed_limit: u32,
    /// Surface of the spawn road.
    pub spawn_condition: RoadCondition,
}

/// The ranges agent parameters are drawn from when not supplied explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeRanges {
    pub max_acceleration: Interval<u32>,
    pub max_deceleration: Interval<u32>,
    pub acceleration_rate: Interval<f32>,
    pub min_distance_to_vehicle_ahead: Interval<u32>,
    pub max_speed_over_limit: Interval<u32>,
    pub road_condition_speed_modifier: Interval<f32>,
    pub pedestrian_max_speed: Interval<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lights: Default::default(),
            following: Default::default(),
            network: Default::default(),
            ranges: Default::default(),
            max_overflow_steps: 64,
        }
    }
}

impl Default for LightTiming {
    fn default() -> Self {
        Self {
            cycle_ticks: Interval::new(240, 450),
            pedestrian_red_ticks: 60,
            driver_red_ticks: 60,
        }
    }
}

impl Default for FollowingParams {
    fn default() -> Self {
        Self {
            free_approach_factor: 3,
            junction_brake_factor: 2,
            follow_accelerate_factor: 4,
            follow_brake_factor: 3,
        }
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            junction_speed_limit: 300,
            crossing_length: 20_000,
            crossing_condition: RoadCondition::SomePotHoles,
            road_offset: 4,
            pavement_offset: 9,
            base_junction_position: Point::new(20, 20),
            spawn_origin: Point::new(-200, -200),
            spawn_length: 100_000,
            spawn_speed_limit: 70,
            spawn_condition: RoadCondition::NoPotHoles,
        }
    }
}

impl Default for AttributeRanges {
    fn default() -> Self {
        Self {
            max_acceleration: Interval::new(5, 8),
            max_deceleration: Interval::new(14, 24),
            acceleration_rate: Interval::new(0.2, 1.0),
            min_distance_to_vehicle_ahead: Interval::new(1000, 9000),
            max_speed_over_limit: Interval::new(0, 30),
            road_condition_speed_modifier: Interval::new(0.0, 0.15),
            pedestrian_max_speed: Interval::new(40, 120),
        }
    }
}
