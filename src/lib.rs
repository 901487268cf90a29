//! A tick-driven micro-simulation of drivers and pedestrians on a network of
//! junctions, roads and pavements.
//!
//! Junctions run a traffic light which gives pedestrians and each incoming road
//! green in turn. Drivers follow the vehicle ahead of them and brake for red lights;
//! pedestrians walk at a jittered pace. Agents with a destination follow fastest
//! routes planned when the simulation starts, and wander randomly otherwise.

pub use agent::MovingObject;
pub use cgmath;
pub use config::{AttributeRanges, FollowingParams, LightTiming, NetworkParams, SimulationConfig};
pub use driver::{Driver, DriverAttributes};
pub use error::{NetworkError, StartError};
pub use junction::{FastestRoute, Junction};
pub use light::{LightState, TrafficLight};
pub use math::Point;
pub use network::Network;
pub use path::{Path, PathKind, PathOrigin, Road, RoadCondition};
pub use pedestrian::{Pedestrian, PedestrianAttributes};
pub use simulation::{PavementAttributes, RoadAttributes, Simulation, DEFAULT_TICK_INTERVAL};
pub use sink::{LineSink, PointSink};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::{Vehicle, VehicleAttributes};

mod agent;
mod config;
mod driver;
mod error;
mod junction;
mod light;
pub mod math;
mod network;
mod path;
mod pedestrian;
mod routing;
mod simulation;
mod sink;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Junction].
    pub struct JunctionId;
    /// Unique ID of a [Path].
    pub struct PathId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [Driver].
    pub struct DriverId;
    /// Unique ID of a [Pedestrian].
    pub struct PedestrianId;
}

type JunctionSet = SlotMap<JunctionId, Junction>;
type PathSet = SlotMap<PathId, Path>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
