use crate::math::{lerp, Point};
use crate::sink::LineSink;
use crate::{JunctionId, PathId, VehicleId, VehicleSet};

/// The surface of a road, which scales the top speed of drivers using it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadCondition {
    New,
    NoPotHoles,
    SomePotHoles,
    LotsOfPotHoles,
    Offroad,
}

/// A directed segment of the network ending at a junction.
pub struct Path {
    /// The path ID.
    id: PathId,
    /// The length in distance units.
    length: u32,
    /// Where the segment starts.
    start: Point,
    /// Where the segment ends.
    end: Point,
    /// The junction at the end of the segment.
    junction: JunctionId,
    /// Whether this is a pavement or a road.
    kind: PathKind,
    /// Where the segment came from.
    origin: PathOrigin,
    /// Paints the segment, if attached.
    sink: Option<Box<dyn LineSink>>,
}

/// The specialization of a [Path].
#[derive(Clone, Debug)]
pub enum PathKind {
    /// A segment used by pedestrians.
    Pavement,
    /// A segment used by drivers.
    Road(Road),
}

/// The attributes specific to roads.
#[derive(Clone, Debug)]
pub struct Road {
    /// The speed limit in distance units per tick.
    speed_limit: u32,
    /// The surface condition.
    condition: RoadCondition,
    /// The vehicle which entered the road most recently.
    tail: Option<VehicleId>,
}

/// How a [Path] became part of the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathOrigin {
    /// Added by the user between two junctions.
    Network,
    /// The segment agents are born on.
    Spawn,
    /// A cached road through a junction, from one road to another.
    Crossing,
    /// A pavement through a junction, discarded once traversed.
    Temporary,
}

impl Path {
    pub(crate) fn new(
        id: PathId,
        length: u32,
        (start, end): (Point, Point),
        junction: JunctionId,
        kind: PathKind,
        origin: PathOrigin,
    ) -> Self {
        Self {
            id,
            length,
            start,
            end,
            junction,
            kind,
            origin,
            sink: None,
        }
    }

    /// Gets the path ID.
    pub fn id(&self) -> PathId {
        self.id
    }

    /// Gets the length of the path.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Gets the start point of the path.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Gets the end point of the path.
    pub fn end(&self) -> Point {
        self.end
    }

    /// Gets the ID of the junction at the end of the path.
    pub fn junction(&self) -> JunctionId {
        self.junction
    }

    /// Gets whether this is a road or a pavement.
    pub fn kind(&self) -> &PathKind {
        &self.kind
    }

    /// Gets how the path became part of the network.
    pub fn origin(&self) -> PathOrigin {
        self.origin
    }

    /// Gets the road attributes, if this path is a road.
    pub fn as_road(&self) -> Option<&Road> {
        match &self.kind {
            PathKind::Road(road) => Some(road),
            PathKind::Pavement => None,
        }
    }

    /// Whether this path is a road.
    pub fn is_road(&self) -> bool {
        self.as_road().is_some()
    }

    /// Gets the speed limit, if this path is a road.
    pub fn speed_limit(&self) -> Option<u32> {
        self.as_road().map(|road| road.speed_limit)
    }

    /// Calculates the position of an object which has travelled
    /// `distance` along the path.
    pub fn position_at(&self, distance: u32) -> Point {
        lerp(self.start, self.end, distance, self.length)
    }

    /// Attaches a sink and hands it the path's geometry.
    pub(crate) fn set_sink(&mut self, mut sink: Box<dyn LineSink>) {
        sink.set_points(self.start, self.end);
        self.sink = Some(sink);
    }

    /// Whether a sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Paints the path, if it has a sink.
    pub(crate) fn paint(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.paint();
        }
    }

    /// Appends a vehicle to the back of the road's queue, behind the
    /// vehicle which entered most recently. Does nothing on pavements.
    pub(crate) fn push_vehicle(&mut self, vehicles: &mut VehicleSet, id: VehicleId) {
        let PathKind::Road(road) = &mut self.kind else {
            return;
        };
        let ahead = road.tail.filter(|tail| vehicles.contains_key(*tail) && *tail != id);
        if let Some(vehicle) = ahead.and_then(|ahead| vehicles.get_mut(ahead)) {
            vehicle.behind = Some(id);
        }
        if let Some(vehicle) = vehicles.get_mut(id) {
            vehicle.ahead = ahead;
            vehicle.behind = None;
        }
        road.tail = Some(id);
    }

    /// Removes a vehicle from the road's queue, linking its neighbours to each other.
    pub(crate) fn remove_vehicle(&mut self, vehicles: &mut VehicleSet, id: VehicleId) {
        let PathKind::Road(road) = &mut self.kind else {
            return;
        };
        let Some(vehicle) = vehicles.get_mut(id) else {
            return;
        };
        let ahead = vehicle.ahead.take();
        let behind = vehicle.behind.take();

        if let Some(vehicle) = behind.and_then(|behind| vehicles.get_mut(behind)) {
            vehicle.ahead = ahead;
        }
        if let Some(vehicle) = ahead.and_then(|ahead| vehicles.get_mut(ahead)) {
            vehicle.behind = behind;
        }
        if road.tail == Some(id) {
            road.tail = ahead;
        }
    }

    /// Forgets every vehicle on the road.
    pub(crate) fn clear_vehicles(&mut self) {
        if let PathKind::Road(road) = &mut self.kind {
            road.tail = None;
        }
    }
}

impl Road {
    pub(crate) fn new(speed_limit: u32, condition: RoadCondition) -> Self {
        Self {
            speed_limit,
            condition,
            tail: None,
        }
    }

    /// Gets the speed limit in distance units per tick.
    pub fn speed_limit(&self) -> u32 {
        self.speed_limit
    }

    /// Gets the surface condition.
    pub fn condition(&self) -> RoadCondition {
        self.condition
    }

    /// Gets the vehicle which entered the road most recently.
    pub fn tail(&self) -> Option<VehicleId> {
        self.tail
    }
}

impl RoadCondition {
    /// All road conditions, from best to worst.
    pub const ALL: [RoadCondition; 5] = [
        RoadCondition::New,
        RoadCondition::NoPotHoles,
        RoadCondition::SomePotHoles,
        RoadCondition::LotsOfPotHoles,
        RoadCondition::Offroad,
    ];

    /// Scales a top speed for this surface.
    ///
    /// # Parameters
    /// * `modifier` - The driver's sensitivity to the road surface
    pub fn speed_factor(self, modifier: f32) -> f32 {
        match self {
            RoadCondition::New => 1.0 + modifier,
            RoadCondition::NoPotHoles => 1.0,
            RoadCondition::SomePotHoles => 1.0 - modifier,
            RoadCondition::LotsOfPotHoles => 1.0 - 2.0 * modifier,
            RoadCondition::Offroad => 1.0 - 3.0 * modifier,
        }
    }
}

impl std::fmt::Display for RoadCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoadCondition::New => "New",
            RoadCondition::NoPotHoles => "NoPotHoles",
            RoadCondition::SomePotHoles => "SomePotHoles",
            RoadCondition::LotsOfPotHoles => "LotsOfPotHoles",
            RoadCondition::Offroad => "Offroad",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vehicle::{Vehicle, VehicleAttributes};
    use assert_approx_eq::assert_approx_eq;
    use slotmap::{Key, SlotMap};

    fn road(length: u32) -> Path {
        Path::new(
            PathId::null(),
            length,
            (Point::new(0, 0), Point::new(100, 50)),
            JunctionId::null(),
            PathKind::Road(Road::new(70, RoadCondition::NoPotHoles)),
            PathOrigin::Network,
        )
    }

    fn add_vehicle(vehicles: &mut VehicleSet) -> VehicleId {
        let attributes = VehicleAttributes {
            max_acceleration: 5,
            max_deceleration: 20,
        };
        vehicles.insert_with_key(|id| Vehicle::new(id, &attributes))
    }

    #[test]
    fn interpolates_between_ends() {
        let path = road(1000);
        assert_eq!(path.position_at(0), path.start());
        assert_eq!(path.position_at(1000), path.end());
        assert_eq!(path.position_at(500), Point::new(50, 25));
        assert_eq!(path.position_at(2000), path.end());
    }

    #[test]
    fn queue_links_and_relinks() {
        let mut vehicles: VehicleSet = SlotMap::with_key();
        let mut path = road(1000);
        let [a, b, c] = [(); 3].map(|_| add_vehicle(&mut vehicles));
        path.push_vehicle(&mut vehicles, a);
        path.push_vehicle(&mut vehicles, b);
        path.push_vehicle(&mut vehicles, c);

        assert_eq!(path.as_road().unwrap().tail(), Some(c));
        assert_eq!(vehicles[c].ahead(), Some(b));
        assert_eq!(vehicles[b].ahead(), Some(a));
        assert_eq!(vehicles[a].behind(), Some(b));

        // The front vehicle leaves
        path.remove_vehicle(&mut vehicles, a);
        assert_eq!(vehicles[b].ahead(), None);
        assert_eq!(vehicles[a].ahead(), None);
        assert_eq!(vehicles[a].behind(), None);

        // The tail leaves
        path.remove_vehicle(&mut vehicles, c);
        assert_eq!(path.as_road().unwrap().tail(), Some(b));
        assert_eq!(vehicles[b].behind(), None);
    }

    #[test]
    fn expired_tail_is_ignored() {
        let mut vehicles: VehicleSet = SlotMap::with_key();
        let mut path = road(1000);
        let a = add_vehicle(&mut vehicles);
        let b = add_vehicle(&mut vehicles);
        path.push_vehicle(&mut vehicles, a);
        vehicles.remove(a);
        path.push_vehicle(&mut vehicles, b);
        assert_eq!(vehicles[b].ahead(), None);
    }

    #[test]
    fn pavements_have_no_queue() {
        let mut vehicles: VehicleSet = SlotMap::with_key();
        let mut path = Path::new(
            PathId::null(),
            10,
            (Point::new(0, 0), Point::new(1, 1)),
            JunctionId::null(),
            PathKind::Pavement,
            PathOrigin::Network,
        );
        let a = add_vehicle(&mut vehicles);
        path.push_vehicle(&mut vehicles, a);
        assert!(path.as_road().is_none());
        assert_eq!(vehicles[a].ahead(), None);
    }

    #[test]
    fn surface_factors() {
        assert_approx_eq!(RoadCondition::New.speed_factor(0.1), 1.1);
        assert_approx_eq!(RoadCondition::NoPotHoles.speed_factor(0.1), 1.0);
        assert_approx_eq!(RoadCondition::Offroad.speed_factor(0.1), 0.7);
    }
}
