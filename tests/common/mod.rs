//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use traffic_tick::{
    JunctionId, LineSink, PavementAttributes, Point, PointSink, RoadAttributes, RoadCondition,
    Simulation, SimulationConfig,
};

/// Everything a [PointLog] was asked to do.
#[derive(Default)]
pub struct PointRecord {
    pub points: Vec<(Point, bool)>,
    pub paints: usize,
}

/// A point sink which records its calls.
#[derive(Clone, Default)]
pub struct PointLog(pub Rc<RefCell<PointRecord>>);

impl PointSink for PointLog {
    fn set_point(&mut self, point: Point, highlight: bool) {
        self.0.borrow_mut().points.push((point, highlight));
    }

    fn paint(&mut self) {
        self.0.borrow_mut().paints += 1;
    }
}

/// Everything a [LineLog] was asked to do.
#[derive(Default)]
pub struct LineRecord {
    pub segments: Vec<(Point, Point)>,
    pub paints: usize,
}

/// A line sink which records its calls.
#[derive(Clone, Default)]
pub struct LineLog(pub Rc<RefCell<LineRecord>>);

impl LineSink for LineLog {
    fn set_points(&mut self, start: Point, end: Point) {
        self.0.borrow_mut().segments.push((start, end));
    }

    fn paint(&mut self) {
        self.0.borrow_mut().paints += 1;
    }
}

/// Attaches sinks which nobody looks at to the base junction and spawn segments.
pub fn attach_base_sinks(sim: &mut Simulation) {
    sim.set_base_sinks(
        Box::new(PointLog::default()),
        Box::new(LineLog::default()),
        Box::new(LineLog::default()),
    );
}

/// Builds a simulation with the base junction and one other junction,
/// connected both ways by a road and a pavement of the given length.
pub fn two_junctions(config: SimulationConfig, seed: u64, length: u32) -> (Simulation, JunctionId) {
    let mut sim = Simulation::with_seed(config, seed);
    attach_base_sinks(&mut sim);
    let base = sim.base_junction();
    let other = sim.add_junction(Point::new(300, 20), None);
    for (from, to) in [(base, other), (other, base)] {
        sim.add_road(
            &RoadAttributes {
                from,
                to,
                length,
                condition: RoadCondition::NoPotHoles,
                speed_limit: 50,
            },
            None,
        )
        .unwrap();
        sim.add_pavement(&PavementAttributes { from, to, length }, None)
            .unwrap();
    }
    (sim, other)
}
