//! Fastest-route planning.
//!
//! For every permanent junction, two independent shortest-path searches are run:
//! one over the roads weighted by travel time, and one over the pavements weighted
//! by length. Only the first segment of each route is recorded.

use std::collections::HashMap;

use log::debug;
use pathfinding::directed::dijkstra::dijkstra_all;

use crate::junction::FastestRoute;
use crate::network::{Mode, Network};
use crate::path::Path;
use crate::{JunctionId, PathId};

/// Scales road travel times so integer costs keep their precision.
const TIME_SCALE: u64 = 1_000_000;

/// Plans the fastest routes between every pair of permanent junctions and
/// installs them into the junctions' route tables.
pub(crate) fn calculate_fastest_routes(network: &mut Network) {
    let sources = network.junction_ids().to_vec();
    let tables = sources
        .iter()
        .map(|src| {
            let mut routes = HashMap::<JunctionId, FastestRoute>::new();
            for (dst, road) in first_hops(network, *src, Mode::Driving) {
                routes.entry(dst).or_default().road = Some(road);
            }
            for (dst, pavement) in first_hops(network, *src, Mode::Walking) {
                routes.entry(dst).or_default().pavement = Some(pavement);
            }
            (*src, routes)
        })
        .collect::<Vec<_>>();

    network.clear_fastest_routes();
    for (src, routes) in tables {
        debug!("{:?} has routes to {} junctions", src, routes.len());
        if let Some(junction) = network.junction_mut(src) {
            junction.set_fastest_routes(routes);
        }
    }
}

/// The cost of traversing a segment: travel time for roads, length for pavements.
pub(crate) fn segment_cost(path: &Path) -> u64 {
    let length = u64::from(path.length());
    match path.speed_limit() {
        Some(limit) => length * TIME_SCALE / u64::from(limit.max(1)),
        None => length,
    }
}

/// Finds, for every junction reachable from `src`, the first segment of the cheapest route to it.
fn first_hops(network: &Network, src: JunctionId, mode: Mode) -> HashMap<JunctionId, PathId> {
    let parents = dijkstra_all(&src, |id| successors(network, *id, mode));
    parents
        .keys()
        .filter_map(|dst| {
            // Walk back up the tree to the junction one segment away from the source
            let mut hop = *dst;
            while let Some(&(parent, _)) = parents.get(&hop) {
                if parent == src {
                    break;
                }
                hop = parent;
            }
            cheapest_segment(network, src, hop, mode).map(|path| (*dst, path))
        })
        .collect()
}

/// The junctions one segment away from `id`, with the cost of getting there.
fn successors(network: &Network, id: JunctionId, mode: Mode) -> Vec<(JunctionId, u64)> {
    network
        .exits(id, mode)
        .iter()
        .filter_map(|path_id| network.path(*path_id))
        .map(|path| (path.junction(), segment_cost(path)))
        .collect()
}

/// The cheapest segment leading directly from `from` to `to`.
fn cheapest_segment(network: &Network, from: JunctionId, to: JunctionId, mode: Mode) -> Option<PathId> {
    network
        .exits(from, mode)
        .iter()
        .filter_map(|path_id| network.path(*path_id))
        .filter(|path| path.junction() == to)
        .min_by_key(|path| segment_cost(path))
        .map(Path::id)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{LightTiming, NetworkParams};
    use crate::math::Point;
    use crate::path::RoadCondition;

    /// A triangle where the direct road is slow but the direct pavement is short.
    fn triangle() -> (Network, [JunctionId; 3], [PathId; 5]) {
        let mut network = Network::new(NetworkParams::default(), LightTiming::default());
        let a = network.add_junction(Point::new(0, 0), 300);
        let b = network.add_junction(Point::new(100, 0), 300);
        let c = network.add_junction(Point::new(100, 100), 300);
        let ab = network.add_road(a, b, 1000, RoadCondition::New, 10).unwrap();
        let bc = network.add_road(b, c, 1000, RoadCondition::New, 10).unwrap();
        let ac = network.add_road(a, c, 3000, RoadCondition::New, 10).unwrap();
        let ab_walk = network.add_pavement(a, b, 1000).unwrap();
        let ac_walk = network.add_pavement(a, c, 1500).unwrap();
        network.add_pavement(b, c, 1000).unwrap();
        (network, [a, b, c], [ab, bc, ac, ab_walk, ac_walk])
    }

    #[test]
    fn roads_and_pavements_are_planned_independently() {
        let (mut network, [a, b, c], [ab, _, _, ab_walk, ac_walk]) = triangle();
        calculate_fastest_routes(&mut network);

        let junction = network.junction(a).unwrap();
        let to_c = junction.fastest_route(c).unwrap();
        assert_eq!(to_c.road, Some(ab));
        assert_eq!(to_c.pavement, Some(ac_walk));

        let to_b = junction.fastest_route(b).unwrap();
        assert_eq!(to_b.road, Some(ab));
        assert_eq!(to_b.pavement, Some(ab_walk));
    }

    #[test]
    fn unreachable_junctions_have_no_entry() {
        let (mut network, [a, _, c], _) = triangle();
        calculate_fastest_routes(&mut network);
        assert!(network.junction(c).unwrap().fastest_route(a).is_none());
        assert!(network.junction(a).unwrap().fastest_route(a).is_none());
    }

    #[test]
    fn parallel_segments_pick_the_cheapest() {
        let mut network = Network::new(NetworkParams::default(), LightTiming::default());
        let a = network.add_junction(Point::new(0, 0), 300);
        let b = network.add_junction(Point::new(100, 0), 300);
        network.add_road(a, b, 1000, RoadCondition::New, 10).unwrap();
        let fast = network.add_road(a, b, 1000, RoadCondition::New, 50).unwrap();
        calculate_fastest_routes(&mut network);
        assert_eq!(network.junction(a).unwrap().fastest_route(b).unwrap().road, Some(fast));
    }

    #[test]
    fn road_cost_is_travel_time() {
        let (network, _, [ab, _, _, ab_walk, _]) = triangle();
        assert_eq!(segment_cost(network.path(ab).unwrap()), 100 * TIME_SCALE);
        assert_eq!(segment_cost(network.path(ab_walk).unwrap()), 1000);
    }
}
