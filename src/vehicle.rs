use rand::Rng;

use crate::config::AttributeRanges;
use crate::VehicleId;

/// The physical state of a driver's vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The most the speed may increase in one tick.
    max_acceleration: u32,
    /// The most the speed may decrease in one tick.
    max_deceleration: u32,
    /// The speed in distance units per tick.
    pub(crate) speed: u32,
    /// The distance travelled along the current road.
    pub(crate) distance_travelled: u32,
    /// The vehicle ahead on the same road.
    pub(crate) ahead: Option<VehicleId>,
    /// The vehicle behind on the same road.
    pub(crate) behind: Option<VehicleId>,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleAttributes {
    /// The most the speed may increase in one tick.
    pub max_acceleration: u32,
    /// The most the speed may decrease in one tick. Must be positive.
    pub max_deceleration: u32,
}

impl Vehicle {
    /// Creates a new, stationary vehicle.
    pub(crate) fn new(id: VehicleId, attributes: &VehicleAttributes) -> Self {
        Self {
            id,
            max_acceleration: attributes.max_acceleration,
            max_deceleration: attributes.max_deceleration.max(1),
            speed: 0,
            distance_travelled: 0,
            ahead: None,
            behind: None,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The most the speed may increase in one tick.
    pub fn max_acceleration(&self) -> u32 {
        self.max_acceleration
    }

    /// The most the speed may decrease in one tick.
    pub fn max_deceleration(&self) -> u32 {
        self.max_deceleration
    }

    /// The speed in distance units per tick.
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// The distance travelled along the current road.
    pub fn distance_travelled(&self) -> u32 {
        self.distance_travelled
    }

    /// The vehicle ahead on the same road, if any.
    pub fn ahead(&self) -> Option<VehicleId> {
        self.ahead
    }

    /// The vehicle behind on the same road, if any.
    pub fn behind(&self) -> Option<VehicleId> {
        self.behind
    }
}

impl VehicleAttributes {
    /// Draws vehicle attributes from the configured ranges.
    pub fn random(rng: &mut impl Rng, ranges: &AttributeRanges) -> Self {
        Self {
            max_acceleration: ranges.max_acceleration.sample(rng),
            max_deceleration: ranges.max_deceleration.sample(rng),
        }
    }
}
