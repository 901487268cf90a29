use std::collections::HashMap;

use itertools::Itertools;
use log::trace;
use slotmap::SlotMap;

use crate::config::{LightTiming, NetworkParams};
use crate::error::NetworkError;
use crate::junction::Junction;
use crate::light::TrafficLight;
use crate::math::{offset_segment, Point};
use crate::path::{Path, PathKind, PathOrigin, Road, RoadCondition};
use crate::{JunctionId, JunctionSet, PathId, PathSet, VehicleSet};

/// Which half of the network an agent travels on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Driving,
    Walking,
}

/// The junctions and segments of a simulation.
pub struct Network {
    /// Every junction, synthetic ones included.
    junctions: JunctionSet,
    /// Every segment, synthetic ones included.
    paths: PathSet,
    /// The permanent junctions, in the order they were added.
    junction_order: Vec<JunctionId>,
    /// The permanent segments, in the order they were added.
    path_order: Vec<PathId>,
    params: NetworkParams,
    timing: LightTiming,
}

impl Network {
    pub(crate) fn new(params: NetworkParams, timing: LightTiming) -> Self {
        Self {
            junctions: SlotMap::with_key(),
            paths: SlotMap::with_key(),
            junction_order: vec![],
            path_order: vec![],
            params,
            timing,
        }
    }

    /// Gets a junction, synthetic or not.
    pub fn junction(&self, id: JunctionId) -> Option<&Junction> {
        self.junctions.get(id)
    }

    /// Gets a segment, synthetic or not.
    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(id)
    }

    /// Returns an iterator over the permanent junctions, in the order they were added.
    pub fn junctions(&self) -> impl Iterator<Item = &Junction> {
        self.junction_order.iter().map(|id| &self.junctions[*id])
    }

    /// Returns an iterator over the permanent segments, in the order they were added.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.path_order.iter().map(|id| &self.paths[*id])
    }

    /// The number of junctions, synthetic ones included.
    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// The number of segments, synthetic ones included.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub(crate) fn junction_mut(&mut self, id: JunctionId) -> Option<&mut Junction> {
        self.junctions.get_mut(id)
    }

    pub(crate) fn path_mut(&mut self, id: PathId) -> Option<&mut Path> {
        self.paths.get_mut(id)
    }

    /// The permanent junctions, in the order they were added.
    pub(crate) fn junction_ids(&self) -> &[JunctionId] {
        &self.junction_order
    }

    /// Adds a junction to the network.
    pub(crate) fn add_junction(&mut self, position: Point, cycle_ticks: u32) -> JunctionId {
        let light = TrafficLight::new(cycle_ticks, self.timing);
        let speed_limit = self.params.junction_speed_limit;
        let id = self
            .junctions
            .insert_with_key(|id| Junction::new(id, position, speed_limit, light));
        self.junction_order.push(id);
        id
    }

    /// Adds a road from one junction to another.
    pub(crate) fn add_road(
        &mut self,
        from: JunctionId,
        to: JunctionId,
        length: u32,
        condition: RoadCondition,
        speed_limit: u32,
    ) -> Result<PathId, NetworkError> {
        let ends = self.segment_ends(from, to, length, self.params.road_offset)?;
        let kind = PathKind::Road(Road::new(speed_limit, condition));
        let id = self.insert_path(length, ends, to, kind, PathOrigin::Network);
        self.junctions[from].add_road_out(id);
        self.junctions[to].add_road_in(id);
        Ok(id)
    }

    /// Adds a pavement from one junction to another.
    pub(crate) fn add_pavement(
        &mut self,
        from: JunctionId,
        to: JunctionId,
        length: u32,
    ) -> Result<PathId, NetworkError> {
        let ends = self.segment_ends(from, to, length, self.params.pavement_offset)?;
        let id = self.insert_path(length, ends, to, PathKind::Pavement, PathOrigin::Network);
        self.junctions[from].add_pavement_out(id);
        Ok(id)
    }

    /// Adds the road or pavement agents are born on, leading from
    /// off-screen into the given junction.
    pub(crate) fn add_spawn_path(&mut self, to: JunctionId, mode: Mode) -> PathId {
        let p = self.params;
        let end = self.junctions[to].position();
        let (kind, offset) = match mode {
            Mode::Driving => (
                PathKind::Road(Road::new(p.spawn_speed_limit, p.spawn_condition)),
                p.road_offset,
            ),
            Mode::Walking => (PathKind::Pavement, p.pavement_offset),
        };
        let ends = offset_segment(p.spawn_origin, end, offset);
        let id = self.insert_path(p.spawn_length.max(1), ends, to, kind, PathOrigin::Spawn);
        if mode == Mode::Driving {
            self.junctions[to].add_road_in(id);
        }
        id
    }

    /// Validates a new segment and calculates its offset end points.
    fn segment_ends(
        &self,
        from: JunctionId,
        to: JunctionId,
        length: u32,
        offset: i16,
    ) -> Result<(Point, Point), NetworkError> {
        let start = self.permanent_junction(from)?.position();
        let end = self.permanent_junction(to)?.position();
        if length == 0 {
            return Err(NetworkError::ZeroLength);
        }
        Ok(offset_segment(start, end, offset))
    }

    /// Gets a junction which the user added to the network.
    pub(crate) fn permanent_junction(&self, id: JunctionId) -> Result<&Junction, NetworkError> {
        self.junctions
            .get(id)
            .filter(|junction| !junction.is_synthetic())
            .ok_or(NetworkError::UnknownJunction(id))
    }

    fn insert_path(
        &mut self,
        length: u32,
        ends: (Point, Point),
        junction: JunctionId,
        kind: PathKind,
        origin: PathOrigin,
    ) -> PathId {
        let id = self
            .paths
            .insert_with_key(|id| Path::new(id, length, ends, junction, kind, origin));
        if matches!(origin, PathOrigin::Network | PathOrigin::Spawn) {
            self.path_order.push(id);
        }
        id
    }

    /// Gets the road through `junction` from the road `from` to the road `to`,
    /// creating it the first time it is requested.
    pub(crate) fn crossing_road(&mut self, junction: JunctionId, from: PathId, to: PathId) -> PathId {
        if let Some(crossing) = self.junctions[junction].crossing(from, to) {
            if self.paths.contains_key(crossing) {
                return crossing;
            }
        }

        let start = self.paths[from].end();
        let speed_limit = self.junctions[junction].speed_limit();
        let condition = self.params.crossing_condition;
        let exit = self.synthetic_junction(to, speed_limit);
        let crossing = self.synthetic_path(
            (start, self.paths[to].start()),
            exit,
            PathKind::Road(Road::new(speed_limit, condition)),
            PathOrigin::Crossing,
        );
        self.junctions[junction].add_crossing(from, to, crossing);
        trace!("created crossing {:?} through {:?} from {:?} to {:?}", crossing, junction, from, to);
        crossing
    }

    /// Creates a single-use pavement from `start` to the start of the pavement `to`.
    pub(crate) fn temporary_pavement(&mut self, start: Point, to: PathId) -> PathId {
        let speed_limit = self.params.junction_speed_limit;
        let exit = self.synthetic_junction(to, speed_limit);
        self.synthetic_path(
            (start, self.paths[to].start()),
            exit,
            PathKind::Pavement,
            PathOrigin::Temporary,
        )
    }

    /// Creates a junction whose only exit is `to`.
    fn synthetic_junction(&mut self, to: PathId, speed_limit: u32) -> JunctionId {
        let position = self.paths[to].start();
        let light = TrafficLight::new(0, self.timing);
        let id = self
            .junctions
            .insert_with_key(|id| Junction::synthetic(id, position, speed_limit, light));
        if self.paths[to].is_road() {
            self.junctions[id].add_road_out(to);
        } else {
            self.junctions[id].add_pavement_out(to);
        }
        id
    }

    fn synthetic_path(
        &mut self,
        ends: (Point, Point),
        junction: JunctionId,
        kind: PathKind,
        origin: PathOrigin,
    ) -> PathId {
        let length = self.params.crossing_length.max(1);
        self.insert_path(length, ends, junction, kind, origin)
    }

    /// Removes a temporary pavement together with its synthetic junction.
    /// Other segments are left untouched.
    pub(crate) fn discard_temporary(&mut self, id: PathId) {
        let Some(path) = self.paths.get(id) else {
            return;
        };
        if path.origin() != PathOrigin::Temporary {
            return;
        }
        let junction = path.junction();
        self.paths.remove(id);
        if self.junctions.get(junction).map_or(false, Junction::is_synthetic) {
            self.junctions.remove(junction);
        }
    }

    /// Removes every temporary pavement.
    pub(crate) fn discard_temporaries(&mut self) {
        let temporaries = self
            .paths
            .values()
            .filter(|path| path.origin() == PathOrigin::Temporary)
            .map(Path::id)
            .collect::<Vec<_>>();
        for id in temporaries {
            self.discard_temporary(id);
        }
    }

    /// Determines whether an object at the end of the given path may enter the junction there.
    /// A path whose junction no longer exists never blocks.
    pub(crate) fn is_green(&self, path: PathId) -> bool {
        self.paths
            .get(path)
            .and_then(|path| self.junctions.get(path.junction()))
            .map_or(true, |junction| junction.is_green_light(path))
    }

    /// Gets the segments agents of the given mode may take from a junction.
    pub(crate) fn exits(&self, junction: JunctionId, mode: Mode) -> &[PathId] {
        match (self.junctions.get(junction), mode) {
            (Some(junction), Mode::Driving) => junction.roads_out(),
            (Some(junction), Mode::Walking) => junction.pavements_out(),
            (None, _) => &[],
        }
    }

    /// Maps each permanent junction to the junctions one segment away from it.
    /// Junctions without exits of the given mode are omitted.
    pub(crate) fn connections(&self, mode: Mode) -> HashMap<JunctionId, Vec<JunctionId>> {
        self.junction_order
            .iter()
            .flat_map(|from| {
                self.exits(*from, mode)
                    .iter()
                    .filter_map(|id| self.paths.get(*id))
                    .map(move |path| (*from, path.junction()))
            })
            .into_group_map()
    }

    /// Advances every permanent junction's light and paints it.
    pub(crate) fn update_junctions(&mut self) {
        for id in &self.junction_order {
            if let Some(junction) = self.junctions.get_mut(*id) {
                junction.update();
            }
        }
    }

    /// Paints every permanent segment.
    pub(crate) fn paint_paths(&mut self) {
        for id in &self.path_order {
            if let Some(path) = self.paths.get_mut(*id) {
                path.paint();
            }
        }
    }

    /// Forgets every fastest route, so they are planned again.
    pub(crate) fn clear_fastest_routes(&mut self) {
        for junction in self.junctions.values_mut() {
            junction.clear_fastest_routes();
        }
    }

    /// Forgets every vehicle queued on a road.
    pub(crate) fn clear_vehicles(&mut self, vehicles: &mut VehicleSet) {
        vehicles.clear();
        for path in self.paths.values_mut() {
            path.clear_vehicles();
        }
    }
}
