use log::{trace, warn};
use rand::Rng;

use crate::agent::{choose_exit, Agent, MovingObject, StepContext};
use crate::config::AttributeRanges;
use crate::math::Point;
use crate::network::Mode;
use crate::sink::PointSink;
use crate::{DriverId, PathId, VehicleId};

use following::{JunctionAhead, SpeedModel};

mod following;

/// An agent driving a vehicle along the roads of the network.
pub struct Driver {
    /// The driver's ID.
    id: DriverId,
    /// The driver's position and destination.
    object: MovingObject,
    /// The road the driver is on.
    road: PathId,
    /// The vehicle the driver owns.
    vehicle: VehicleId,
    /// How the driver behaves.
    attributes: DriverAttributes,
}

/// The behaviour of a simulated driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverAttributes {
    /// How much of the vehicle's acceleration is left when reaching top speed, from 0 to 1.
    pub acceleration_rate: f32,
    /// The gap kept to the vehicle ahead, on top of the braking distance.
    pub min_distance_to_vehicle_ahead: u32,
    /// How far over the speed limit the driver is willing to go.
    pub max_speed_over_limit: u32,
    /// How strongly the road surface changes the driver's top speed.
    pub road_condition_speed_modifier: f32,
}

impl DriverAttributes {
    /// Draws driver attributes from the configured ranges.
    pub fn random(rng: &mut impl Rng, ranges: &AttributeRanges) -> Self {
        Self {
            acceleration_rate: ranges.acceleration_rate.sample(rng),
            min_distance_to_vehicle_ahead: ranges.min_distance_to_vehicle_ahead.sample(rng),
            max_speed_over_limit: ranges.max_speed_over_limit.sample(rng),
            road_condition_speed_modifier: ranges.road_condition_speed_modifier.sample(rng),
        }
    }
}

impl Driver {
    pub(crate) fn new(
        id: DriverId,
        road: PathId,
        position: Point,
        vehicle: VehicleId,
        attributes: DriverAttributes,
        sink: Option<Box<dyn PointSink>>,
    ) -> Self {
        Self {
            id,
            object: MovingObject::new(position, sink),
            road,
            vehicle,
            attributes,
        }
    }

    /// Gets the driver's ID.
    pub fn id(&self) -> DriverId {
        self.id
    }

    /// Gets the driver's position and destination.
    pub fn object(&self) -> &MovingObject {
        &self.object
    }

    /// Gets the ID of the road the driver is on.
    pub fn road(&self) -> PathId {
        self.road
    }

    /// Gets the ID of the driver's vehicle.
    pub fn vehicle(&self) -> VehicleId {
        self.vehicle
    }

    /// Gets the driver's attributes.
    pub fn attributes(&self) -> &DriverAttributes {
        &self.attributes
    }

    /// Chooses the vehicle's speed for this tick.
    fn calculate_new_speed(&self, ctx: &StepContext) -> u32 {
        let Some(path) = ctx.network.path(self.road) else {
            return 0;
        };
        let (Some(road), Some(vehicle)) = (path.as_road(), ctx.vehicles.get(self.vehicle)) else {
            return 0;
        };
        let model = SpeedModel::new(vehicle, &self.attributes, road, *ctx.following);

        match vehicle.ahead().and_then(|id| ctx.vehicles.get(id)) {
            Some(ahead) => {
                let gap = i64::from(ahead.distance_travelled()) - i64::from(vehicle.distance_travelled());
                model.follow_vehicle(vehicle.speed(), gap, ahead.speed())
            }
            None => {
                let junction = JunctionAhead {
                    green: ctx.network.is_green(self.road),
                    speed_limit: ctx
                        .network
                        .junction(path.junction())
                        .map_or(road.speed_limit(), |junction| junction.speed_limit()),
                };
                let remaining = path.length().saturating_sub(vehicle.distance_travelled());
                model.approach_junction(vehicle.speed(), remaining, junction)
            }
        }
    }
}

impl Agent for Driver {
    const MODE: Mode = Mode::Driving;

    fn object(&self) -> &MovingObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut MovingObject {
        &mut self.object
    }

    fn path(&self) -> PathId {
        self.road
    }

    fn next_step(&mut self, ctx: &mut StepContext) -> u32 {
        let speed = self.calculate_new_speed(ctx);
        if let Some(vehicle) = ctx.vehicles.get_mut(self.vehicle) {
            vehicle.speed = speed;
        }
        speed
    }

    /// Keeps the vehicle behind the one ahead of it.
    fn limit_distance(&self, ctx: &StepContext, current: u32, target: u32) -> u32 {
        ctx.vehicles
            .get(self.vehicle)
            .and_then(|vehicle| vehicle.ahead())
            .and_then(|id| ctx.vehicles.get(id))
            .map_or(target, |ahead| target.min(ahead.distance_travelled().max(current)))
    }

    fn set_distance_travelled(&mut self, ctx: &mut StepContext, distance: u32) {
        self.object.set_distance_travelled(distance);
        if let Some(vehicle) = ctx.vehicles.get_mut(self.vehicle) {
            vehicle.distance_travelled = distance;
        }
    }

    fn select_new_path(&mut self, ctx: &mut StepContext) -> bool {
        let Some(old) = ctx.network.path(self.road) else {
            return false;
        };
        let (junction, old_end) = (old.junction(), old.end());
        self.object.arrive_at(junction);

        let next = choose_exit(ctx, junction, self.object.destination(), Self::MODE);
        let Some((next, next_start)) = next.and_then(|id| Some((id, ctx.network.path(id)?.start()))) else {
            warn!("{:?} is stuck at {:?}, which has no outgoing road", self.id, junction);
            return false;
        };

        if let Some(old) = ctx.network.path_mut(self.road) {
            old.remove_vehicle(ctx.vehicles, self.vehicle);
        }
        self.object.set_position(old_end);
        let road = if next_start == old_end {
            next
        } else {
            ctx.network.crossing_road(junction, self.road, next)
        };
        trace!("{:?} moves from {:?} onto {:?}", self.id, self.road, road);

        self.road = road;
        self.set_distance_travelled(ctx, 0);
        if let Some(road) = ctx.network.path_mut(road) {
            road.push_vehicle(ctx.vehicles, self.vehicle);
        }
        true
    }
}
