use log::{trace, warn};
use rand::Rng;

use crate::agent::{choose_exit, Agent, MovingObject, StepContext};
use crate::config::AttributeRanges;
use crate::math::Point;
use crate::network::Mode;
use crate::path::PathOrigin;
use crate::sink::PointSink;
use crate::{PathId, PedestrianId};

/// An agent walking along the pavements of the network.
pub struct Pedestrian {
    /// The pedestrian's ID.
    id: PedestrianId,
    /// The pedestrian's position and destination.
    object: MovingObject,
    /// The pavement the pedestrian is on.
    path: PathId,
    /// How the pedestrian behaves.
    attributes: PedestrianAttributes,
}

/// The behaviour of a simulated pedestrian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PedestrianAttributes {
    /// The longest step the pedestrian takes in one tick.
    pub max_speed: u32,
}

impl PedestrianAttributes {
    /// Draws pedestrian attributes from the configured ranges.
    pub fn random(rng: &mut impl Rng, ranges: &AttributeRanges) -> Self {
        Self {
            max_speed: ranges.pedestrian_max_speed.sample(rng),
        }
    }

    /// Draws the length of one step, which is between two thirds of
    /// the maximum speed and the maximum speed.
    fn step(&self, rng: &mut impl Rng) -> u32 {
        let jitter = self.max_speed / 3;
        if jitter == 0 {
            return self.max_speed;
        }
        self.max_speed - rng.gen_range(0..jitter)
    }
}

impl Pedestrian {
    pub(crate) fn new(
        id: PedestrianId,
        path: PathId,
        position: Point,
        attributes: PedestrianAttributes,
        sink: Option<Box<dyn PointSink>>,
    ) -> Self {
        Self {
            id,
            object: MovingObject::new(position, sink),
            path,
            attributes,
        }
    }

    /// Gets the pedestrian's ID.
    pub fn id(&self) -> PedestrianId {
        self.id
    }

    /// Gets the pedestrian's position and destination.
    pub fn object(&self) -> &MovingObject {
        &self.object
    }

    /// Gets the ID of the pavement the pedestrian is on.
    pub fn path(&self) -> PathId {
        self.path
    }

    /// Gets the pedestrian's attributes.
    pub fn attributes(&self) -> &PedestrianAttributes {
        &self.attributes
    }
}

impl Agent for Pedestrian {
    const MODE: Mode = Mode::Walking;

    fn object(&self) -> &MovingObject {
        &self.object
    }

    fn object_mut(&mut self) -> &mut MovingObject {
        &mut self.object
    }

    fn path(&self) -> PathId {
        self.path
    }

    fn next_step(&mut self, ctx: &mut StepContext) -> u32 {
        self.attributes.step(&mut *ctx.rng)
    }

    fn set_distance_travelled(&mut self, _ctx: &mut StepContext, distance: u32) {
        self.object.set_distance_travelled(distance);
    }

    fn select_new_path(&mut self, ctx: &mut StepContext) -> bool {
        let Some(old) = ctx.network.path(self.path) else {
            return false;
        };
        let (junction, old_end) = (old.junction(), old.end());
        let temporary = old.origin() == PathOrigin::Temporary;
        self.object.arrive_at(junction);

        let next = choose_exit(ctx, junction, self.object.destination(), Self::MODE);
        let Some((next, next_start)) = next.and_then(|id| Some((id, ctx.network.path(id)?.start()))) else {
            warn!("{:?} is stuck at {:?}, which has no outgoing pavement", self.id, junction);
            return false;
        };

        self.object.set_position(old_end);
        let path = if next_start == old_end {
            next
        } else {
            ctx.network.temporary_pavement(old_end, next)
        };
        if temporary {
            ctx.network.discard_temporary(self.path);
        }
        trace!("{:?} moves from {:?} onto {:?}", self.id, self.path, path);

        self.path = path;
        self.object.set_distance_travelled(0);
        true
    }
}
