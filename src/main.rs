use std::error::Error;
use std::time::Instant;

use log::info;
use traffic_tick::{
    LineSink, PavementAttributes, Point, PointSink, RoadAttributes, RoadCondition, Simulation,
    DEFAULT_TICK_INTERVAL,
};

/// Discards everything it is asked to paint.
struct Headless;

impl PointSink for Headless {
    fn set_point(&mut self, _point: Point, _highlight: bool) {}
    fn paint(&mut self) {}
}

impl LineSink for Headless {
    fn set_points(&mut self, _start: Point, _end: Point) {}
    fn paint(&mut self) {}
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let num_ticks: u32 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 50,
    };

    let mut sim = Simulation::new();
    sim.set_base_sinks(Box::new(Headless), Box::new(Headless), Box::new(Headless));

    // A square of junctions around the base junction
    let base = sim.base_junction();
    let corners = [
        sim.add_junction(Point::new(320, 20), Some(Box::new(Headless))),
        sim.add_junction(Point::new(320, 320), Some(Box::new(Headless))),
        sim.add_junction(Point::new(20, 320), Some(Box::new(Headless))),
    ];
    let ring = [base, corners[0], corners[1], corners[2], base];
    for pair in ring.windows(2) {
        for (from, to) in [(pair[0], pair[1]), (pair[1], pair[0])] {
            let road = RoadAttributes {
                from,
                to,
                length: 30_000,
                condition: RoadCondition::NoPotHoles,
                speed_limit: 60,
            };
            sim.add_road(&road, Some(Box::new(Headless)))?;
            let pavement = PavementAttributes {
                from,
                to,
                length: 30_000,
            };
            sim.add_pavement(&pavement, Some(Box::new(Headless)))?;
        }
    }

    for _ in 0..20 {
        sim.add_driver(None, None, Some(Box::new(Headless)));
        sim.add_pedestrian(None, Some(Box::new(Headless)));
    }
    sim.set_destination(Some(corners[1]))?;
    sim.start(DEFAULT_TICK_INTERVAL)?;

    for _ in 0..num_ticks {
        let start = Instant::now();
        sim.tick();
        let arrived = sim
            .iter_drivers()
            .filter(|driver| driver.object().destination().is_none())
            .count();
        info!(
            "frame {}: {:?} per tick, {} of {} drivers arrived",
            sim.frame(),
            start.elapsed(),
            arrived,
            sim.iter_drivers().count(),
        );
        std::thread::sleep(sim.tick_interval().saturating_sub(start.elapsed()));
    }

    sim.stop();
    Ok(())
}
