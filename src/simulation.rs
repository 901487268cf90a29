use std::collections::HashMap;
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use slotmap::SlotMap;

use crate::agent::{Agent, StepContext};
use crate::config::SimulationConfig;
use crate::driver::{Driver, DriverAttributes};
use crate::error::{NetworkError, StartError};
use crate::junction::Junction;
use crate::math::Point;
use crate::network::{Mode, Network};
use crate::path::{Path, RoadCondition};
use crate::pedestrian::{Pedestrian, PedestrianAttributes};
use crate::routing;
use crate::sink::{LineSink, PointSink};
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{DriverId, JunctionId, PathId, PedestrianId, VehicleId, VehicleSet};

/// The interval between ticks suggested to the embedding application.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A traffic simulation.
pub struct Simulation {
    /// The configuration the simulation was created with.
    config: SimulationConfig,
    /// The junctions and segments.
    network: Network,
    /// The vehicles owned by the drivers.
    vehicles: VehicleSet,
    /// The drivers being simulated.
    drivers: SlotMap<DriverId, Driver>,
    /// The pedestrians being simulated.
    pedestrians: SlotMap<PedestrianId, Pedestrian>,
    /// The junction every agent spawns towards.
    base_junction: JunctionId,
    /// The road new drivers start on.
    spawn_road: PathId,
    /// The pavement new pedestrians start on.
    spawn_pavement: PathId,
    /// The random source of the simulation.
    rng: StdRng,
    /// Whether ticks currently advance the simulation.
    running: bool,
    /// The interval between ticks requested at start.
    tick_interval: Duration,
    /// Whether the topology changed since the fastest routes were planned.
    routes_dirty: bool,
    /// The current frame of simulation.
    frame: usize,
}

/// The attributes of a road.
#[derive(Clone, Copy, Debug)]
pub struct RoadAttributes {
    /// The junction the road starts at.
    pub from: JunctionId,
    /// The junction the road ends at.
    pub to: JunctionId,
    /// The length of the road. Must be positive.
    pub length: u32,
    /// The surface of the road.
    pub condition: RoadCondition,
    /// The speed limit in distance units per tick.
    pub speed_limit: u32,
}

/// The attributes of a pavement.
#[derive(Clone, Copy, Debug)]
pub struct PavementAttributes {
    /// The junction the pavement starts at.
    pub from: JunctionId,
    /// The junction the pavement ends at.
    pub to: JunctionId,
    /// The length of the pavement. Must be positive.
    pub length: u32,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Creates a new simulation with the default configuration and a randomly seeded random source.
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a new simulation with a randomly seeded random source.
    pub fn with_config(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a new simulation whose random choices are determined by `seed`.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulationConfig, mut rng: StdRng) -> Self {
        let mut network = Network::new(config.network, config.lights);
        let cycle_ticks = config.lights.cycle_ticks.sample(&mut rng);
        let base_junction = network.add_junction(config.network.base_junction_position, cycle_ticks);
        let spawn_road = network.add_spawn_path(base_junction, Mode::Driving);
        let spawn_pavement = network.add_spawn_path(base_junction, Mode::Walking);

        Self {
            config,
            network,
            vehicles: SlotMap::with_key(),
            drivers: SlotMap::with_key(),
            pedestrians: SlotMap::with_key(),
            base_junction,
            spawn_road,
            spawn_pavement,
            rng,
            running: false,
            tick_interval: DEFAULT_TICK_INTERVAL,
            routes_dirty: true,
            frame: 0,
        }
    }

    /// Gets the configuration the simulation was created with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Gets the junction every agent spawns towards.
    pub fn base_junction(&self) -> JunctionId {
        self.base_junction
    }

    /// Gets the road new drivers start on.
    pub fn spawn_road(&self) -> PathId {
        self.spawn_road
    }

    /// Gets the pavement new pedestrians start on.
    pub fn spawn_pavement(&self) -> PathId {
        self.spawn_pavement
    }

    /// Attaches sinks to the base junction and the spawn road and pavement.
    /// The simulation refuses to start until this is done.
    pub fn set_base_sinks(
        &mut self,
        junction: Box<dyn PointSink>,
        road: Box<dyn LineSink>,
        pavement: Box<dyn LineSink>,
    ) {
        if let Some(base) = self.network.junction_mut(self.base_junction) {
            base.set_sink(junction);
        }
        if let Some(path) = self.network.path_mut(self.spawn_road) {
            path.set_sink(road);
        }
        if let Some(path) = self.network.path_mut(self.spawn_pavement) {
            path.set_sink(pavement);
        }
    }

    /// Adds a junction to the network.
    pub fn add_junction(&mut self, position: Point, sink: Option<Box<dyn PointSink>>) -> JunctionId {
        let cycle_ticks = self.config.lights.cycle_ticks.sample(&mut self.rng);
        let id = self.network.add_junction(position, cycle_ticks);
        if let (Some(junction), Some(sink)) = (self.network.junction_mut(id), sink) {
            junction.set_sink(sink);
        }
        self.topology_changed();
        id
    }

    /// Adds a road to the network.
    pub fn add_road(
        &mut self,
        attributes: &RoadAttributes,
        sink: Option<Box<dyn LineSink>>,
    ) -> Result<PathId, NetworkError> {
        let id = self.network.add_road(
            attributes.from,
            attributes.to,
            attributes.length,
            attributes.condition,
            attributes.speed_limit,
        )?;
        self.attach_line_sink(id, sink);
        self.topology_changed();
        Ok(id)
    }

    /// Adds a pavement to the network.
    pub fn add_pavement(
        &mut self,
        attributes: &PavementAttributes,
        sink: Option<Box<dyn LineSink>>,
    ) -> Result<PathId, NetworkError> {
        let id = self
            .network
            .add_pavement(attributes.from, attributes.to, attributes.length)?;
        self.attach_line_sink(id, sink);
        self.topology_changed();
        Ok(id)
    }

    fn attach_line_sink(&mut self, id: PathId, sink: Option<Box<dyn LineSink>>) {
        if let (Some(path), Some(sink)) = (self.network.path_mut(id), sink) {
            path.set_sink(sink);
        }
    }

    /// Forgets the planned routes, so they are planned again before the next tick.
    fn topology_changed(&mut self) {
        self.network.clear_fastest_routes();
        self.routes_dirty = true;
    }

    /// Adds a driver to the start of the spawn road.
    ///
    /// # Parameters
    /// * `vehicle` - The vehicle's attributes, randomized if `None`
    /// * `driver` - The driver's attributes, randomized if `None`
    /// * `sink` - Paints the driver, if given
    pub fn add_driver(
        &mut self,
        vehicle: Option<VehicleAttributes>,
        driver: Option<DriverAttributes>,
        sink: Option<Box<dyn PointSink>>,
    ) -> DriverId {
        let ranges = self.config.ranges;
        let vehicle = vehicle.unwrap_or_else(|| VehicleAttributes::random(&mut self.rng, &ranges));
        let attributes = driver.unwrap_or_else(|| DriverAttributes::random(&mut self.rng, &ranges));

        let vehicle_id = self
            .vehicles
            .insert_with_key(|id| Vehicle::new(id, &vehicle));
        let (road, start) = (self.spawn_road, self.spawn_point(self.spawn_road));
        let id = self
            .drivers
            .insert_with_key(|id| Driver::new(id, road, start, vehicle_id, attributes, sink));
        if let Some(road) = self.network.path_mut(self.spawn_road) {
            road.push_vehicle(&mut self.vehicles, vehicle_id);
        }
        debug!("added {:?} driving {:?}", id, vehicle_id);
        id
    }

    /// Adds a pedestrian to the start of the spawn pavement.
    ///
    /// # Parameters
    /// * `max_speed` - The longest step the pedestrian takes, randomized if `None`
    /// * `sink` - Paints the pedestrian, if given
    pub fn add_pedestrian(
        &mut self,
        max_speed: Option<u32>,
        sink: Option<Box<dyn PointSink>>,
    ) -> PedestrianId {
        let attributes = match max_speed {
            Some(max_speed) => PedestrianAttributes { max_speed },
            None => PedestrianAttributes::random(&mut self.rng, &self.config.ranges),
        };
        let (pavement, start) = (self.spawn_pavement, self.spawn_point(self.spawn_pavement));
        let id = self
            .pedestrians
            .insert_with_key(|id| Pedestrian::new(id, pavement, start, attributes, sink));
        debug!("added {:?}", id);
        id
    }

    /// Where agents are born on the given spawn segment.
    fn spawn_point(&self, spawn: PathId) -> Point {
        self.network
            .path(spawn)
            .map_or(self.config.network.spawn_origin, Path::start)
    }

    /// Sets or clears the destination of every agent currently in the simulation.
    pub fn set_destination(&mut self, destination: Option<JunctionId>) -> Result<(), NetworkError> {
        self.check_destination(destination)?;
        for driver in self.drivers.values_mut() {
            driver.object_mut().set_destination(destination);
        }
        for pedestrian in self.pedestrians.values_mut() {
            pedestrian.object_mut().set_destination(destination);
        }
        Ok(())
    }

    /// Sets or clears the destination of a single driver.
    pub fn set_driver_destination(
        &mut self,
        id: DriverId,
        destination: Option<JunctionId>,
    ) -> Result<(), NetworkError> {
        self.check_destination(destination)?;
        let driver = self
            .drivers
            .get_mut(id)
            .ok_or(NetworkError::UnknownDriver(id))?;
        driver.object_mut().set_destination(destination);
        Ok(())
    }

    /// Sets or clears the destination of a single pedestrian.
    pub fn set_pedestrian_destination(
        &mut self,
        id: PedestrianId,
        destination: Option<JunctionId>,
    ) -> Result<(), NetworkError> {
        self.check_destination(destination)?;
        let pedestrian = self
            .pedestrians
            .get_mut(id)
            .ok_or(NetworkError::UnknownPedestrian(id))?;
        pedestrian.object_mut().set_destination(destination);
        Ok(())
    }

    fn check_destination(&self, destination: Option<JunctionId>) -> Result<(), NetworkError> {
        match destination {
            Some(id) => self.network.permanent_junction(id).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Validates the network, plans the fastest routes and starts the simulation.
    /// Starting a running simulation does nothing.
    ///
    /// # Parameters
    /// * `interval` - The interval the embedding application should call [Self::tick] at
    pub fn start(&mut self, interval: Duration) -> Result<(), StartError> {
        if self.running {
            return Ok(());
        }
        self.validate()?;
        self.calculate_fastest_routes();
        self.running = true;
        self.tick_interval = interval;
        info!(
            "simulation started with {} junctions, {} drivers and {} pedestrians",
            self.network.junctions().count(),
            self.drivers.len(),
            self.pedestrians.len()
        );
        Ok(())
    }

    /// Checks that the simulation can be started.
    fn validate(&self) -> Result<(), StartError> {
        let base_sinks = self
            .network
            .junction(self.base_junction)
            .map_or(false, Junction::has_sink)
            && [self.spawn_road, self.spawn_pavement]
                .iter()
                .all(|id| self.network.path(*id).map_or(false, |path| path.has_sink()));
        if !base_sinks {
            return Err(StartError::BaseSinksMissing);
        }

        for junction in self.network.junctions() {
            if junction.roads_out().is_empty() {
                return Err(StartError::NoOutgoingRoad(junction.id()));
            }
            if junction.pavements_out().is_empty() {
                return Err(StartError::NoOutgoingPavement(junction.id()));
            }
        }
        Ok(())
    }

    /// Stops the simulation without discarding its state. Stopping a stopped simulation does nothing.
    pub fn stop(&mut self) {
        if self.running {
            info!("simulation stopped at frame {}", self.frame);
        }
        self.running = false;
    }

    /// Whether ticks currently advance the simulation.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Gets the interval between ticks requested when the simulation was started.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Advances the simulation by one tick, if it is running.
    /// Returns whether the simulation advanced.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if self.routes_dirty {
            self.calculate_fastest_routes();
        }
        self.update_objects();
        self.frame += 1;
        true
    }

    /// Updates the junctions, then the segments, then the drivers, then the pedestrians.
    fn update_objects(&mut self) {
        self.network.update_junctions();
        self.network.paint_paths();

        let mut ctx = StepContext {
            network: &mut self.network,
            vehicles: &mut self.vehicles,
            rng: &mut self.rng,
            following: &self.config.following,
            max_overflow_steps: self.config.max_overflow_steps,
        };
        for driver in self.drivers.values_mut() {
            driver.update(&mut ctx);
        }
        for pedestrian in self.pedestrians.values_mut() {
            pedestrian.update(&mut ctx);
        }
    }

    /// Stops the simulation and removes every agent, keeping the network.
    pub fn reset(&mut self) {
        self.stop();
        self.drivers.clear();
        self.pedestrians.clear();
        self.network.clear_vehicles(&mut self.vehicles);
        self.network.discard_temporaries();
        self.frame = 0;
        info!("simulation reset");
    }

    /// Plans the fastest road and pavement routes between every pair of junctions.
    /// This happens automatically when the simulation starts.
    pub fn calculate_fastest_routes(&mut self) {
        routing::calculate_fastest_routes(&mut self.network);
        self.routes_dirty = false;
    }

    /// Maps each junction to the junctions one road away from it.
    pub fn connected_junctions_by_road(&self) -> HashMap<JunctionId, Vec<JunctionId>> {
        self.network.connections(Mode::Driving)
    }

    /// Maps each junction to the junctions one pavement away from it.
    pub fn connected_junctions_by_pavement(&self) -> HashMap<JunctionId, Vec<JunctionId>> {
        self.network.connections(Mode::Walking)
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the network of junctions and segments.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Returns an iterator over the junctions of the network.
    pub fn iter_junctions(&self) -> impl Iterator<Item = &Junction> {
        self.network.junctions()
    }

    /// Returns an iterator over all the drivers in the simulation.
    pub fn iter_drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    /// Returns an iterator over all the pedestrians in the simulation.
    pub fn iter_pedestrians(&self) -> impl Iterator<Item = &Pedestrian> {
        self.pedestrians.values()
    }

    /// Gets a reference to the driver with the given ID.
    pub fn driver(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(id)
    }

    /// Gets a reference to the pedestrian with the given ID.
    pub fn pedestrian(&self, id: PedestrianId) -> Option<&Pedestrian> {
        self.pedestrians.get(id)
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn base_network_exists_from_the_start() {
        let sim = Simulation::with_seed(SimulationConfig::default(), 1);
        let base = sim.network().junction(sim.base_junction()).unwrap();
        assert_eq!(base.position(), Point::new(20, 20));
        assert_eq!(base.roads_in(), &[sim.spawn_road()]);

        let spawn = sim.network().path(sim.spawn_road()).unwrap();
        assert_eq!(spawn.junction(), sim.base_junction());
        assert_eq!(spawn.speed_limit(), Some(70));
        assert_eq!(spawn.length(), 100_000);
        assert!(sim.network().path(sim.spawn_pavement()).unwrap().as_road().is_none());
    }

    #[test]
    fn randomized_agents_respect_ranges() {
        let mut sim = Simulation::with_seed(SimulationConfig::default(), 2);
        let ranges = sim.config().ranges;
        for _ in 0..20 {
            let id = sim.add_driver(None, None, None);
            let driver = sim.driver(id).unwrap();
            let vehicle = sim.vehicle(driver.vehicle()).unwrap();
            assert!(ranges.max_acceleration.contains(vehicle.max_acceleration()));
            assert!(ranges.max_deceleration.contains(vehicle.max_deceleration()));
            assert!(ranges.acceleration_rate.contains(driver.attributes().acceleration_rate));
            assert!(ranges.max_speed_over_limit.contains(driver.attributes().max_speed_over_limit));

            let id = sim.add_pedestrian(None, None);
            let max_speed = sim.pedestrian(id).unwrap().attributes().max_speed;
            assert!(ranges.pedestrian_max_speed.contains(max_speed));
        }
    }

    #[test]
    fn new_drivers_queue_on_the_spawn_road() {
        let mut sim = Simulation::with_seed(SimulationConfig::default(), 3);
        let first = sim.add_driver(None, None, None);
        let second = sim.add_driver(None, None, None);
        let first = sim.driver(first).unwrap().vehicle();
        let second = sim.driver(second).unwrap().vehicle();

        assert_eq!(sim.vehicle(second).unwrap().ahead(), Some(first));
        assert_eq!(sim.vehicle(first).unwrap().behind(), Some(second));
        let spawn = sim.network().path(sim.spawn_road()).unwrap();
        assert_eq!(spawn.as_road().unwrap().tail(), Some(second));
    }

    #[test]
    fn destinations_must_be_junctions() {
        let mut sim = Simulation::with_seed(SimulationConfig::default(), 4);
        let driver = sim.add_driver(None, None, None);
        let junction = sim.add_junction(Point::new(100, 100), None);

        sim.set_destination(Some(junction)).unwrap();
        assert_eq!(sim.driver(driver).unwrap().object().destination(), Some(junction));

        sim.set_driver_destination(driver, None).unwrap();
        assert_eq!(sim.driver(driver).unwrap().object().destination(), None);

        let unknown = JunctionId::default();
        assert_eq!(
            sim.set_destination(Some(unknown)),
            Err(NetworkError::UnknownJunction(unknown))
        );
        assert_eq!(
            sim.set_pedestrian_destination(PedestrianId::default(), None),
            Err(NetworkError::UnknownPedestrian(PedestrianId::default()))
        );
    }
}
