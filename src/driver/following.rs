use crate::config::FollowingParams;
use crate::path::Road;
use crate::vehicle::Vehicle;

use super::DriverAttributes;

/// The car-following model of a driver on a particular road.
///
/// Speeds and distances are integers. The model compares the distance to whatever
/// is ahead against multiples of a braking-distance proxy, and either accelerates
/// towards the driver's top speed or brakes in proportion to how far inside the
/// braking threshold the vehicle already is.
#[derive(Clone, Debug)]
pub(crate) struct SpeedModel {
    /// The most the speed may increase in one tick.
    max_acc: u32,
    /// The most the speed may decrease in one tick, at least 1.
    max_dec: u32,
    /// How much of the acceleration remains when at top speed.
    acc_rate: f32,
    /// The gap kept to the vehicle ahead on top of the braking distance.
    min_gap: u32,
    /// The speed the driver accelerates towards on this road.
    top_speed: u32,
    params: FollowingParams,
}

/// The junction at the end of the road, as seen by a driver with nobody ahead.
#[derive(Clone, Copy, Debug)]
pub(crate) struct JunctionAhead {
    /// Whether the driver may enter the junction.
    pub green: bool,
    /// The speed limit through the junction.
    pub speed_limit: u32,
}

impl SpeedModel {
    /// Creates the speed model of a driver and vehicle on the given road.
    pub fn new(
        vehicle: &Vehicle,
        driver: &DriverAttributes,
        road: &Road,
        params: FollowingParams,
    ) -> Self {
        let limit = road.speed_limit().saturating_add(driver.max_speed_over_limit);
        let factor = road.condition().speed_factor(driver.road_condition_speed_modifier);
        Self {
            max_acc: vehicle.max_acceleration(),
            max_dec: vehicle.max_deceleration().max(1),
            acc_rate: driver.acceleration_rate,
            min_gap: driver.min_distance_to_vehicle_ahead,
            top_speed: (limit as f32 * factor).max(0.0) as u32,
            params,
        }
    }

    /// The braking-distance proxy for a vehicle with no vehicle ahead.
    fn braking_distance(&self, speed: u32) -> u64 {
        u64::from(speed) * u64::from(speed) / u64::from(self.max_dec)
    }

    /// Chooses the next speed of a driver with no vehicle ahead.
    ///
    /// # Parameters
    /// * `speed` - The current speed
    /// * `remaining` - The distance left to the junction
    /// * `junction` - The junction at the end of the road
    pub fn approach_junction(&self, speed: u32, remaining: u32, junction: JunctionAhead) -> u32 {
        let k = self.braking_distance(speed);
        let d = u64::from(remaining);

        // Pull away from a standstill without overshooting the line
        if speed == 0 && d > 0 {
            return self.accelerate(speed).min(remaining);
        }
        if d > u64::from(self.params.free_approach_factor) * k {
            return self.accelerate(speed);
        }
        if junction.green {
            return match speed.cmp(&junction.speed_limit) {
                std::cmp::Ordering::Less => self.accelerate(speed),
                std::cmp::Ordering::Greater => self.decelerate(speed, k, k),
                std::cmp::Ordering::Equal => speed,
            };
        }
        if d == 0 {
            return self.decelerate(speed, u64::from(speed), 0);
        }
        let threshold = u64::from(self.params.junction_brake_factor) * k;
        if d < threshold {
            return self.decelerate(speed, threshold - d, k);
        }
        speed
    }

    /// Chooses the next speed of a driver following another vehicle.
    ///
    /// # Parameters
    /// * `speed` - The current speed
    /// * `gap` - How much further the vehicle ahead has travelled along the road
    /// * `their_speed` - The speed of the vehicle ahead
    pub fn follow_vehicle(&self, speed: u32, gap: i64, their_speed: u32) -> u32 {
        let k = i64::from(speed.abs_diff(their_speed)) * i64::from(speed) / i64::from(self.max_dec);
        let min_gap = i64::from(self.min_gap);
        if gap > i64::from(self.params.follow_accelerate_factor) * k + min_gap {
            return self.accelerate(speed);
        }
        let threshold = i64::from(self.params.follow_brake_factor) * k + min_gap;
        if gap < threshold {
            return self.decelerate(speed, (threshold - gap) as u64, k as u64);
        }
        speed
    }

    /// Increases the speed towards the top speed. The increment shrinks as
    /// the top speed is approached, but is always at least 1.
    pub fn accelerate(&self, speed: u32) -> u32 {
        if self.top_speed == 0 {
            return 0;
        }
        let modifier = 1.0 - (1.0 - self.acc_rate) * (speed as f32 / self.top_speed as f32);
        let increment = ((self.max_acc as f32 * modifier) as u32).max(1);
        speed.saturating_add(increment).min(self.top_speed)
    }

    /// Decreases the speed by `too_close * max_dec / denom`, rounded up.
    /// A zero `denom` brakes by at most `too_close`, capped at the maximum deceleration.
    pub fn decelerate(&self, speed: u32, too_close: u64, denom: u64) -> u32 {
        let max_dec = u64::from(self.max_dec);
        let reduction = if denom == 0 {
            too_close.min(max_dec)
        } else {
            (too_close.saturating_mul(max_dec) + denom - 1) / denom
        };
        speed - reduction.min(u64::from(speed)) as u32
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::RoadCondition;
    use crate::vehicle::VehicleAttributes;
    use crate::VehicleId;
    use slotmap::Key;

    fn model(condition: RoadCondition, modifier: f32) -> SpeedModel {
        let vehicle = Vehicle::new(
            VehicleId::null(),
            &VehicleAttributes {
                max_acceleration: 8,
                max_deceleration: 20,
            },
        );
        let driver = DriverAttributes {
            acceleration_rate: 0.5,
            min_distance_to_vehicle_ahead: 1000,
            max_speed_over_limit: 10,
            road_condition_speed_modifier: modifier,
        };
        let road = Road::new(90, condition);
        SpeedModel::new(&vehicle, &driver, &road, FollowingParams::default())
    }

    const RED: JunctionAhead = JunctionAhead {
        green: false,
        speed_limit: 300,
    };

    #[test]
    fn top_speed_depends_on_surface() {
        assert_eq!(model(RoadCondition::NoPotHoles, 0.1).top_speed, 100);
        assert_eq!(model(RoadCondition::New, 0.1).top_speed, 110);
        assert_eq!(model(RoadCondition::LotsOfPotHoles, 0.1).top_speed, 80);
    }

    #[test]
    fn acceleration_is_damped_near_top_speed() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        assert_eq!(model.accelerate(0), 8);
        assert_eq!(model.accelerate(50), 56);
        assert_eq!(model.accelerate(99), 100);
        assert_eq!(model.accelerate(100), 100);
        assert_eq!(model.accelerate(150), 100);
    }

    #[test]
    fn deceleration_never_goes_negative() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        assert_eq!(model.decelerate(50, 10, 0), 40);
        assert_eq!(model.decelerate(50, 100, 0), 30);
        assert_eq!(model.decelerate(50, 3, 2), 20);
        assert_eq!(model.decelerate(5, 1000, 1), 0);
    }

    #[test]
    fn far_from_junction_accelerates() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        assert_eq!(model.approach_junction(0, 100_000, RED), 8);
        assert_eq!(model.approach_junction(40, 100_000, RED), 46);
    }

    #[test]
    fn pulling_away_does_not_pass_the_line() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        assert_eq!(model.approach_junction(0, 3, RED), 3);
        assert_eq!(model.approach_junction(0, 0, RED), 0);
    }

    #[test]
    fn brakes_for_red_light() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        // k = 40 * 40 / 20 = 80
        assert_eq!(model.approach_junction(40, 100, RED), 25);
        assert_eq!(model.approach_junction(40, 200, RED), 40);
        assert_eq!(model.approach_junction(40, 0, RED), 20);
    }

    #[test]
    fn green_light_matches_junction_speed() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        let green = |speed_limit| JunctionAhead {
            green: true,
            speed_limit,
        };
        assert_eq!(model.approach_junction(40, 100, green(300)), 46);
        assert_eq!(model.approach_junction(40, 100, green(40)), 40);
        assert_eq!(model.approach_junction(40, 100, green(30)), 20);
    }

    #[test]
    fn follows_vehicle_ahead() {
        let model = model(RoadCondition::NoPotHoles, 0.0);
        // Same speeds: k = 0, so only the minimum gap matters
        assert_eq!(model.follow_vehicle(40, 5000, 40), 46);
        assert_eq!(model.follow_vehicle(40, 1000, 40), 40);
        assert_eq!(model.follow_vehicle(40, 990, 40), 30);
        // Closing in: k = 20 * 40 / 20 = 40
        assert_eq!(model.follow_vehicle(40, 1130, 20), 40);
        assert_eq!(model.follow_vehicle(40, 1100, 20), 30);
        assert_eq!(model.follow_vehicle(40, 1161, 20), 46);
        assert_eq!(model.follow_vehicle(40, 1080, 20), 20);
        // Gap already gone
        assert_eq!(model.follow_vehicle(40, -10, 0), 0);
    }
}
