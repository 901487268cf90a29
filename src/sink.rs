//! Rendering callbacks the engine paints through.
//!
//! The engine only ever calls into these; entities without a sink are still
//! simulated but never rendered.

use crate::math::Point;

/// Renders a single point, such as a junction, driver or pedestrian.
pub trait PointSink {
    /// Sets the point to be painted next.
    fn set_point(&mut self, point: Point, highlight: bool);

    /// Paints the point.
    fn paint(&mut self);
}

/// Renders a straight segment, such as a road or pavement.
pub trait LineSink {
    /// Sets the end points of the segment. Called once, when the sink is attached.
    fn set_points(&mut self, start: Point, end: Point);

    /// Paints the segment.
    fn paint(&mut self);
}
