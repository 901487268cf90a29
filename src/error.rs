use thiserror::Error;

use crate::{DriverId, JunctionId, PedestrianId};

/// Reasons a simulation refuses to start.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    #[error("sinks for the base junction and spawn segments were never attached")]
    BaseSinksMissing,

    #[error("junction {0:?} has no outgoing road")]
    NoOutgoingRoad(JunctionId),

    #[error("junction {0:?} has no outgoing pavement")]
    NoOutgoingPavement(JunctionId),
}

/// Errors raised while editing the network or its agents.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    #[error("junction {0:?} is not part of the network")]
    UnknownJunction(JunctionId),

    #[error("driver {0:?} is not part of the simulation")]
    UnknownDriver(DriverId),

    #[error("pedestrian {0:?} is not part of the simulation")]
    UnknownPedestrian(PedestrianId),

    #[error("segments must have a positive length")]
    ZeroLength,
}
