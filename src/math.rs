//! Integer screen-space geometry.

use cgmath::{Point2, Vector2};

/// A 2D point on the network canvas.
pub type Point = Point2<i16>;

/// A 2D displacement between two [Point]s.
pub type Vector = Vector2<i16>;

/// Linearly interpolates between `start` and `end`.
///
/// # Parameters
/// * `num` - Distance travelled along the segment, clamped to `den`
/// * `den` - Total length of the segment
pub fn lerp(start: Point, end: Point, num: u32, den: u32) -> Point {
    if den == 0 {
        return start;
    }
    let t = f64::from(num.min(den)) / f64::from(den);
    let x = f64::from(start.x) + t * (f64::from(end.x) - f64::from(start.x));
    let y = f64::from(start.y) + t * (f64::from(end.y) - f64::from(start.y));
    Point::new(x.round() as i16, y.round() as i16)
}

/// Shifts both ends of a segment sideways so that segments running in
/// opposite directions between the same junctions do not overlap.
pub fn offset_segment(start: Point, end: Point, offset: i16) -> (Point, Point) {
    let dx = if start.y > end.y { -offset } else { offset };
    let dy = if start.x < end.x { -offset } else { offset };
    let shift = |p: Point| Point::new(p.x.saturating_add(dx), p.y.saturating_add(dy));
    (shift(start), shift(end))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lerp_ends() {
        let a = Point::new(-10, 4);
        let b = Point::new(90, -46);
        assert_eq!(lerp(a, b, 0, 1000), a);
        assert_eq!(lerp(a, b, 1000, 1000), b);
        assert_eq!(lerp(a, b, 5000, 1000), b);
        assert_eq!(lerp(a, b, 500, 1000), Point::new(40, -21));
    }

    #[test]
    fn lerp_is_monotonic() {
        let a = Point::new(0, 0);
        let b = Point::new(300, 120);
        let mut prev = a;
        for d in (0..=7000).step_by(70) {
            let p = lerp(a, b, d, 7000);
            assert!(p.x >= prev.x && p.y >= prev.y);
            prev = p;
        }
    }

    #[test]
    fn opposite_segments_do_not_overlap() {
        let a = Point::new(20, 20);
        let b = Point::new(300, 20);
        let forward = offset_segment(a, b, 4);
        let backward = offset_segment(b, a, 4);
        assert_eq!(forward, (Point::new(24, 16), Point::new(304, 16)));
        assert_eq!(backward, (Point::new(304, 24), Point::new(24, 24)));
    }

    #[test]
    fn offsets_saturate_at_the_canvas_edge() {
        let a = Point::new(i16::MIN, 100);
        let b = Point::new(i16::MIN, 0);
        assert_eq!(
            offset_segment(a, b, 9),
            (Point::new(i16::MIN, 109), Point::new(i16::MIN, 9))
        );

        let a = Point::new(i16::MAX - 2, i16::MAX);
        let b = Point::new(i16::MAX, i16::MAX);
        assert_eq!(
            offset_segment(a, b, 4),
            (Point::new(i16::MAX, i16::MAX - 4), Point::new(i16::MAX, i16::MAX - 4))
        );
    }
}
