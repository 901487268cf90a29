use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::FollowingParams;
use crate::math::Point;
use crate::network::{Mode, Network};
use crate::path::Path;
use crate::sink::PointSink;
use crate::{JunctionId, PathId, VehicleSet};

/// The state shared by everything that moves through the network.
pub struct MovingObject {
    /// The current position.
    position: Point,
    /// The junction the object is heading for, if any.
    destination: Option<JunctionId>,
    /// The distance travelled along the current segment.
    distance_travelled: u32,
    /// Paints the object, if attached.
    sink: Option<Box<dyn PointSink>>,
}

/// Everything an agent may read or modify while it moves during a tick.
pub(crate) struct StepContext<'a> {
    pub network: &'a mut Network,
    pub vehicles: &'a mut VehicleSet,
    pub rng: &'a mut StdRng,
    pub following: &'a FollowingParams,
    /// The most segments an agent may enter within one tick.
    pub max_overflow_steps: usize,
}

impl MovingObject {
    pub(crate) fn new(position: Point, sink: Option<Box<dyn PointSink>>) -> Self {
        Self {
            position,
            destination: None,
            distance_travelled: 0,
            sink,
        }
    }

    /// Gets the current position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Gets the junction the object is heading for, if any.
    pub fn destination(&self) -> Option<JunctionId> {
        self.destination
    }

    /// Gets the distance travelled along the current segment.
    pub fn distance_travelled(&self) -> u32 {
        self.distance_travelled
    }

    /// Whether a sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub(crate) fn set_destination(&mut self, destination: Option<JunctionId>) {
        self.destination = destination;
    }

    pub(crate) fn set_distance_travelled(&mut self, distance: u32) {
        self.distance_travelled = distance;
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Clears the destination if it is the junction just reached.
    pub(crate) fn arrive_at(&mut self, junction: JunctionId) {
        if self.destination == Some(junction) {
            debug!("arrived at destination {:?}", junction);
            self.destination = None;
        }
    }

    /// Hands the current position to the sink and paints it.
    /// Objects with a destination are highlighted.
    pub(crate) fn paint(&mut self) {
        let (position, highlight) = (self.position, self.destination.is_some());
        if let Some(sink) = self.sink.as_mut() {
            sink.set_point(position, highlight);
            sink.paint();
        }
    }
}

/// The motion rules of a driver or pedestrian.
pub(crate) trait Agent {
    /// The half of the network the agent travels on.
    const MODE: Mode;

    fn object(&self) -> &MovingObject;

    fn object_mut(&mut self) -> &mut MovingObject;

    /// The segment the agent is currently on.
    fn path(&self) -> PathId;

    /// Decides how far the agent moves this tick.
    fn next_step(&mut self, ctx: &mut StepContext) -> u32;

    /// Caps the distance the agent may reach along its current segment.
    fn limit_distance(&self, _ctx: &StepContext, _current: u32, target: u32) -> u32 {
        target
    }

    fn set_distance_travelled(&mut self, ctx: &mut StepContext, distance: u32);

    /// Moves the agent from the end of its segment onto the next one.
    /// Returns false if the junction offers no way on.
    fn select_new_path(&mut self, ctx: &mut StepContext) -> bool;

    /// Advances the agent by one tick's worth of movement.
    fn move_object(&mut self, ctx: &mut StepContext) {
        let step = self.next_step(ctx);
        self.do_step(step, ctx);
        let distance = self.object().distance_travelled();
        if let Some(position) = ctx.network.path(self.path()).map(|p| p.position_at(distance)) {
            self.object_mut().set_position(position);
        }
    }

    /// Moves the agent `step` units forward, carrying any distance left over at the end
    /// of a segment onto the next one within the same tick.
    ///
    /// Panics if the agent enters more than `max_overflow_steps` segments, which only
    /// happens when the network contains a cycle of near-zero length segments.
    fn do_step(&mut self, step: u32, ctx: &mut StepContext) {
        let mut step = step;
        let mut entered = 0;
        loop {
            let path_id = self.path();
            let Some(length) = ctx.network.path(path_id).map(Path::length) else {
                return;
            };
            let travelled = self.object().distance_travelled();
            let target = self.limit_distance(ctx, travelled, travelled.saturating_add(step));
            if target <= length {
                self.set_distance_travelled(ctx, target);
                return;
            }
            // Wait at the line
            self.set_distance_travelled(ctx, length);
            if !ctx.network.is_green(path_id) {
                return;
            }

            step = target - length;
            entered += 1;
            if entered > ctx.max_overflow_steps {
                panic!(
                    "agent entered more than {} segments in one tick",
                    ctx.max_overflow_steps
                );
            }
            if !self.select_new_path(ctx) {
                return;
            }
        }
    }

    /// Moves the agent and paints it.
    fn update(&mut self, ctx: &mut StepContext) {
        self.move_object(ctx);
        self.object_mut().paint();
    }
}

/// Chooses the segment to leave a junction by: the first segment of the fastest
/// route to the destination if there is one, otherwise a random exit.
pub(crate) fn choose_exit(
    ctx: &mut StepContext,
    junction_id: JunctionId,
    destination: Option<JunctionId>,
    mode: Mode,
) -> Option<PathId> {
    let junction = ctx.network.junction(junction_id)?;
    if let Some(destination) = destination {
        let fastest = match mode {
            Mode::Driving => junction.fastest_road(destination),
            Mode::Walking => junction.fastest_pavement(destination),
        };
        if fastest.is_some() {
            return fastest;
        }
        warn!(
            "{:?} has no {:?} route to {:?}, choosing a random exit",
            junction_id, mode, destination
        );
    }
    ctx.network
        .exits(junction_id, mode)
        .choose(&mut *ctx.rng)
        .copied()
}
