use std::collections::HashMap;

use smallvec::SmallVec;

use crate::light::{LightState, TrafficLight};
use crate::math::Point;
use crate::sink::PointSink;
use crate::{JunctionId, PathId};

/// A node of the network, which owns a traffic light and knows
/// the segments leaving it.
pub struct Junction {
    /// The junction ID.
    id: JunctionId,
    /// The position of the junction's centre.
    position: Point,
    /// The speed limit through the junction.
    speed_limit: u32,
    /// The traffic light.
    light: TrafficLight,
    /// Roads ending here, in the order they get green.
    roads_in: SmallVec<[PathId; 4]>,
    /// Roads starting here.
    roads_out: SmallVec<[PathId; 4]>,
    /// Pavements starting here.
    pavements_out: SmallVec<[PathId; 4]>,
    /// The first segments of the fastest routes to other junctions.
    fastest_routes: HashMap<JunctionId, FastestRoute>,
    /// Cached roads through the junction, keyed by the road arrived on
    /// and the road to be taken.
    crossings: HashMap<(PathId, PathId), PathId>,
    /// Whether the junction only exists to cross into a segment.
    synthetic: bool,
    /// Paints the junction, if attached.
    sink: Option<Box<dyn PointSink>>,
}

/// The segments to take from a junction towards a destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FastestRoute {
    /// The first road of the fastest road route, if there is one.
    pub road: Option<PathId>,
    /// The first pavement of the shortest pavement route, if there is one.
    pub pavement: Option<PathId>,
}

impl Junction {
    pub(crate) fn new(id: JunctionId, position: Point, speed_limit: u32, light: TrafficLight) -> Self {
        Self {
            id,
            position,
            speed_limit,
            light,
            roads_in: SmallVec::new(),
            roads_out: SmallVec::new(),
            pavements_out: SmallVec::new(),
            fastest_routes: HashMap::new(),
            crossings: HashMap::new(),
            synthetic: false,
            sink: None,
        }
    }

    /// Creates a junction which leads into exactly one segment, used to cross
    /// onto it from wherever an agent currently is. It has no incoming
    /// roads, so its light is always green.
    pub(crate) fn synthetic(id: JunctionId, position: Point, speed_limit: u32, light: TrafficLight) -> Self {
        Self {
            synthetic: true,
            ..Self::new(id, position, speed_limit, light)
        }
    }

    /// Gets the junction ID.
    pub fn id(&self) -> JunctionId {
        self.id
    }

    /// Gets the position of the junction's centre.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Gets the speed limit through the junction.
    pub fn speed_limit(&self) -> u32 {
        self.speed_limit
    }

    /// Gets the traffic light.
    pub fn light(&self) -> &TrafficLight {
        &self.light
    }

    /// Whether the junction only exists to cross into a segment.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Gets the roads ending at this junction.
    pub fn roads_in(&self) -> &[PathId] {
        &self.roads_in
    }

    /// Gets the roads starting at this junction.
    pub fn roads_out(&self) -> &[PathId] {
        &self.roads_out
    }

    /// Gets the pavements starting at this junction.
    pub fn pavements_out(&self) -> &[PathId] {
        &self.pavements_out
    }

    /// Determines whether an object on the given path may enter the junction.
    ///
    /// While pedestrians have green, anything not arriving on one of the
    /// incoming roads may cross. While drivers have green, only the road
    /// selected by the rotation may.
    pub fn is_green_light(&self, path_id: PathId) -> bool {
        if self.roads_in.is_empty() {
            return true;
        }
        match self.light.state() {
            LightState::PedestrianGreen => !self.roads_in.contains(&path_id),
            LightState::DriverGreen => self.roads_in.get(self.light.green_road()) == Some(&path_id),
            LightState::PedestrianRed | LightState::DriverRed => false,
        }
    }

    /// Gets the first road of the fastest route to `destination`.
    /// When only one road leaves the junction it is returned without consulting the route table.
    pub fn fastest_road(&self, destination: JunctionId) -> Option<PathId> {
        if let [road] = &self.roads_out[..] {
            return Some(*road);
        }
        self.fastest_routes.get(&destination).and_then(|route| route.road)
    }

    /// Gets the first pavement of the shortest route to `destination`.
    /// When only one pavement leaves the junction it is returned without consulting the route table.
    pub fn fastest_pavement(&self, destination: JunctionId) -> Option<PathId> {
        if let [pavement] = &self.pavements_out[..] {
            return Some(*pavement);
        }
        self.fastest_routes.get(&destination).and_then(|route| route.pavement)
    }

    /// Gets the recorded fastest route to `destination`.
    pub fn fastest_route(&self, destination: JunctionId) -> Option<&FastestRoute> {
        self.fastest_routes.get(&destination)
    }

    pub(crate) fn add_road_in(&mut self, path_id: PathId) {
        self.roads_in.push(path_id);
    }

    pub(crate) fn add_road_out(&mut self, path_id: PathId) {
        self.roads_out.push(path_id);
    }

    pub(crate) fn add_pavement_out(&mut self, path_id: PathId) {
        self.pavements_out.push(path_id);
    }

    pub(crate) fn set_fastest_routes(&mut self, routes: HashMap<JunctionId, FastestRoute>) {
        self.fastest_routes = routes;
    }

    pub(crate) fn clear_fastest_routes(&mut self) {
        self.fastest_routes.clear();
    }

    pub(crate) fn crossing(&self, from: PathId, to: PathId) -> Option<PathId> {
        self.crossings.get(&(from, to)).copied()
    }

    pub(crate) fn add_crossing(&mut self, from: PathId, to: PathId, crossing: PathId) {
        self.crossings.insert((from, to), crossing);
    }

    /// Attaches a sink and hands it the junction's position.
    pub(crate) fn set_sink(&mut self, mut sink: Box<dyn PointSink>) {
        sink.set_point(self.position, self.pedestrians_have_green());
        self.sink = Some(sink);
    }

    /// Whether a sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Advances the traffic light by one tick and paints the junction.
    pub(crate) fn update(&mut self) {
        self.light.step(self.roads_in.len());
        let highlight = self.pedestrians_have_green();
        if let Some(sink) = self.sink.as_mut() {
            sink.set_point(self.position, highlight);
            sink.paint();
        }
    }

    fn pedestrians_have_green(&self) -> bool {
        self.light.state() == LightState::PedestrianGreen
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::LightTiming;
    use crate::util::Interval;
    use slotmap::{KeyData, SlotMap};

    fn junction(roads_in: &[PathId]) -> Junction {
        let timing = LightTiming {
            cycle_ticks: Interval::exactly(10),
            pedestrian_red_ticks: 2,
            driver_red_ticks: 2,
        };
        let mut junction = Junction::new(
            JunctionId::from(KeyData::from_ffi(1)),
            Point::new(0, 0),
            300,
            TrafficLight::new(10, timing),
        );
        for road in roads_in {
            junction.add_road_in(*road);
        }
        junction
    }

    fn path_ids(count: usize) -> Vec<PathId> {
        let mut ids = SlotMap::<PathId, ()>::with_key();
        (0..count).map(|_| ids.insert(())).collect()
    }

    #[test]
    fn no_incoming_roads_is_always_green() {
        let ids = path_ids(1);
        let mut junction = junction(&[]);
        for _ in 0..40 {
            assert!(junction.is_green_light(ids[0]));
            junction.update();
        }
    }

    #[test]
    fn lights_are_mutually_exclusive() {
        let ids = path_ids(4);
        let (roads, pavement) = (&ids[..3], ids[3]);
        let mut junction = junction(roads);
        for _ in 0..200 {
            let green_roads = roads.iter().filter(|r| junction.is_green_light(**r)).count();
            let pedestrians = junction.is_green_light(pavement);
            assert!(green_roads <= 1);
            assert!(!(pedestrians && green_roads > 0));
            match junction.light().state() {
                LightState::PedestrianGreen => assert!(pedestrians),
                LightState::DriverGreen => assert_eq!(green_roads, 1),
                _ => assert!(!pedestrians && green_roads == 0),
            }
            junction.update();
        }
    }

    #[test]
    fn single_exit_short_circuits_route_table() {
        let ids = path_ids(3);
        let mut junction = junction(&[]);
        let destination = JunctionId::from(KeyData::from_ffi(9));
        assert_eq!(junction.fastest_road(destination), None);

        junction.add_road_out(ids[0]);
        assert_eq!(junction.fastest_road(destination), Some(ids[0]));

        junction.add_road_out(ids[1]);
        assert_eq!(junction.fastest_road(destination), None);

        let routes = HashMap::from([(
            destination,
            FastestRoute {
                road: Some(ids[1]),
                pavement: None,
            },
        )]);
        junction.set_fastest_routes(routes);
        assert_eq!(junction.fastest_road(destination), Some(ids[1]));
        assert_eq!(junction.fastest_pavement(destination), None);
    }
}
