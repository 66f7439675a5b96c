//! Pairwise collision predicates.
//!
//! Every symmetric pair is implemented once and dispatched both ways from
//! [`shapes_collide`]. Degenerate geometry (zero-length segments, parallel
//! segments) never collides.

use glam::Vec2;

use crate::shape::{Circle, Dot, Line, Rectangle, Shape};

/// Dispatch a collision test between any two shapes.
pub fn shapes_collide(a: &Shape, b: &Shape) -> bool {
    use Shape::*;
    match (a, b) {
        (Circle(a), Circle(b)) => circle_circle(a, b),
        (Circle(c), Dot(d)) | (Dot(d), Circle(c)) => circle_dot(c, *d),
        (Circle(c), Line(l)) | (Line(l), Circle(c)) => circle_line(c, l),
        (Circle(c), Rectangle(r)) | (Rectangle(r), Circle(c)) => circle_rectangle(c, r),
        (Rectangle(a), Rectangle(b)) => rectangle_rectangle(a, b),
        (Rectangle(r), Dot(d)) | (Dot(d), Rectangle(r)) => r.contains(*d),
        (Rectangle(r), Line(l)) | (Line(l), Rectangle(r)) => rectangle_line(r, l),
        (Line(l), Dot(d)) | (Dot(d), Line(l)) => line_dot(l, *d),
        (Line(a), Line(b)) => segment_segment(a, b),
        (Dot(a), Dot(b)) => a == b,
    }
}

/// Centers closer than the sum of radii. Touching circles do not collide.
#[inline]
pub fn circle_circle(a: &Circle, b: &Circle) -> bool {
    a.center.distance(b.center) < a.radius + b.radius
}

#[inline]
pub fn circle_dot(circle: &Circle, dot: Dot) -> bool {
    circle.center.distance(dot) < circle.radius
}

/// Circle against a thick segment.
///
/// The circle center is moved into the segment's local frame, clamped to
/// the segment rectangle, and the distance to that closest point compared
/// with the radius. Width counts: a circle grazing the side of a wide
/// segment collides even when it is far from the segment's axis.
pub fn circle_line(circle: &Circle, line: &Line) -> bool {
    if line.is_degenerate() {
        return false;
    }
    let local = line.to_local(circle.center);
    let half = line.half_extents();
    let closest = local.clamp(-half, half);
    local.distance(closest) < circle.radius
}

/// Closest point of the rectangle within the radius. Edges count.
#[inline]
pub fn circle_rectangle(circle: &Circle, rect: &Rectangle) -> bool {
    circle.center.distance(rect.clamp(circle.center)) <= circle.radius
}

#[inline]
pub fn rectangle_rectangle(a: &Rectangle, b: &Rectangle) -> bool {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y
}

/// Point inside the thick segment's rotated rectangle.
pub fn line_dot(line: &Line, dot: Dot) -> bool {
    if line.is_degenerate() {
        return false;
    }
    let local = line.to_local(dot);
    let half = line.half_extents();
    local.x.abs() <= half.x && local.y.abs() <= half.y
}

/// Zero-width segment intersection.
///
/// Both parameters must lie strictly inside `(0, 1)`, so segments that only
/// share an endpoint, or are parallel, do not intersect.
pub fn line_line(a: &Line, b: &Line) -> bool {
    let (Vec2 { x: x1, y: y1 }, Vec2 { x: x2, y: y2 }) = (a.p1, a.p2);
    let (Vec2 { x: x3, y: y3 }, Vec2 { x: x4, y: y4 }) = (b.p1, b.p2);

    let det = (x2 - x1) * (y4 - y3) - (x4 - x3) * (y2 - y1);
    if det == 0.0 {
        return false;
    }
    let lambda = ((y4 - y3) * (x4 - x1) + (x3 - x4) * (y4 - y1)) / det;
    let gamma = ((y1 - y2) * (x4 - x1) + (x2 - x1) * (y4 - y1)) / det;
    (0.0 < lambda && lambda < 1.0) && (0.0 < gamma && gamma < 1.0)
}

/// Two thick segments, each treated as its rotated rectangle.
///
/// Overlap means a corner of one inside the other, or crossing borders.
/// Identical segments always collide with each other.
pub fn segment_segment(a: &Line, b: &Line) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    if a == b {
        return true;
    }
    if a.corners().iter().any(|&corner| line_dot(b, corner))
        || b.corners().iter().any(|&corner| line_dot(a, corner))
    {
        return true;
    }
    let b_edges = b.edges();
    a.edges()
        .iter()
        .any(|edge| b_edges.iter().any(|other| line_line(edge, other)))
}

/// Axis-aligned rectangle against a thick segment.
///
/// Three checks, each catching a case the others miss: a segment corner
/// inside the rectangle, a rectangle corner inside the segment, and
/// crossing borders when neither contains a corner of the other.
pub fn rectangle_line(rect: &Rectangle, line: &Line) -> bool {
    if line.is_degenerate() {
        return false;
    }
    if line.corners().iter().any(|&corner| rect.contains(corner)) {
        return true;
    }
    if rect.corners().iter().any(|&corner| line_dot(line, corner)) {
        return true;
    }
    let rect_edges = rect.edges();
    line.edges()
        .iter()
        .any(|edge| rect_edges.iter().any(|other| line_line(edge, other)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn dot(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn circle(x: f32, y: f32, r: f32) -> Circle {
        Circle::new(dot(x, y), r)
    }

    fn line(x1: f32, y1: f32, x2: f32, y2: f32, width: f32) -> Line {
        Line::new(dot(x1, y1), dot(x2, y2), width)
    }

    #[test]
    fn test_line_line() {
        assert!(!line_line(&line(0.0, 0.0, 0.0, 10.0, 1.0), &line(10.0, 0.0, 10.0, 10.0, 1.0)));
        assert!(line_line(&line(0.0, 0.0, 10.0, 10.0, 1.0), &line(10.0, 0.0, 0.0, 10.0, 1.0)));
        // Parallel neighbours: zero determinant.
        assert!(!line_line(&line(0.0, 0.0, 0.0, 10.0, 1.0), &line(1.0, 0.0, 1.0, 10.0, 1.0)));
    }

    #[test]
    fn test_circle_circle_boundary_exclusive() {
        let a = circle(0.0, 0.0, 1.0);
        let touching = circle(3.0, 0.0, 2.0);
        let overlapping = circle(3.0 - 1e-3, 0.0, 2.0);
        assert!(!circle_circle(&a, &touching));
        assert!(!circle_circle(&touching, &a));
        assert!(circle_circle(&a, &overlapping));
        assert!(circle_circle(&overlapping, &a));
    }

    #[test]
    fn test_circle_circle_containment() {
        assert!(circle_circle(&circle(0.0, 0.0, 1.0), &circle(0.1, 0.1, 0.1)));
        assert!(!circle_circle(&circle(0.0, 0.0, 0.2), &circle(10.0, 10.0, 0.2)));
    }

    #[test]
    fn test_circle_line() {
        assert!(!circle_line(&circle(0.0, 0.0, 0.5), &line(10.0, 10.0, 10.0, 0.0, 3.0)));
        assert!(circle_line(&circle(0.0, 0.0, 1.0), &line(0.0, 0.0, 1.0, 0.0, 3.0)));
        // Only the width reaches the circle.
        assert!(circle_line(&circle(0.0, 0.0, 1.0), &line(2.0, 2.0, 2.0, 0.0, 3.0)));
        assert!(circle_line(&circle(0.0, 0.0, 0.5), &line(0.0, 2.0, 3.0, 2.0, 10.0)));
        assert!(circle_line(&circle(0.0, 0.0, 0.5), &line(2.0, -2.0, 2.0, 2.0, 10.0)));
        assert!(circle_line(&circle(0.0, 0.0, 0.5), &line(1.0, 0.0, 2.0, 2.0, 10.0)));
    }

    #[test]
    fn test_circle_on_axis_collides_at_any_rotation() {
        let center = dot(50.0, 50.0);
        for step in 0..4 {
            let angle = step as f32 * FRAC_PI_4;
            let dir = Vec2::from_angle(angle);
            let seg = Line::new(center - dir * 10.0, center + dir * 10.0, 4.0);
            // Offset across the axis, still inside half the width.
            let probe = Circle::new(center + dir.perp() * 1.5, 0.1);
            assert!(circle_line(&probe, &seg), "angle {angle}");
            let shapes = (Shape::Circle(probe), Shape::Line(seg));
            assert!(shapes.0.collides(&shapes.1));
            assert!(shapes.1.collides(&shapes.0));
        }
    }

    #[test]
    fn test_circle_past_segment_end() {
        let seg = line(0.0, 0.0, 10.0, 0.0, 2.0);
        assert!(!circle_line(&circle(12.0, 0.0, 1.5), &seg));
        assert!(circle_line(&circle(11.0, 0.0, 1.5), &seg));
    }

    #[test]
    fn test_degenerate_line_never_collides() {
        let point = line(5.0, 5.0, 5.0, 5.0, 3.0);
        assert!(!circle_line(&circle(5.0, 5.0, 10.0), &point));
        assert!(!rectangle_line(&Rectangle::new(0.0, 0.0, 10.0, 10.0), &point));
    }

    #[test]
    fn test_segment_segment() {
        let a = line(0.0, 0.0, 10.0, 0.0, 2.0);
        assert!(segment_segment(&a, &a));
        // Side by side, widths overlapping.
        assert!(segment_segment(&a, &line(0.0, 1.5, 10.0, 1.5, 2.0)));
        assert!(!segment_segment(&a, &line(0.0, 3.0, 10.0, 3.0, 2.0)));
        // Crossing bars.
        assert!(segment_segment(&a, &line(5.0, -5.0, 5.0, 5.0, 1.0)));
        assert!(!segment_segment(&a, &line(15.0, -5.0, 15.0, 5.0, 1.0)));
    }

    #[test]
    fn test_circle_rectangle() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_rectangle(&circle(5.0, 5.0, 1.0), &rect));
        assert!(circle_rectangle(&circle(11.0, 5.0, 1.0), &rect));
        assert!(!circle_rectangle(&circle(12.0, 12.0, 1.0), &rect));
    }

    #[test]
    fn test_rectangle_line() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        assert!(rectangle_line(&rect, &line(0.0, 10.5, 10.0, 10.5, 1.0)));
        assert!(rectangle_line(&rect, &line(5.0, 5.0, 15.0, 15.0, 1.0)));
        assert!(rectangle_line(&rect, &line(2.0, 2.0, 8.0, 8.0, 1.0)));
        assert!(rectangle_line(&rect, &line(5.0, 0.0, 5.0, 10.0, 1.0)));
        assert!(!rectangle_line(&rect, &line(15.0, 0.0, 15.0, 10.0, 1.0)));
    }

    #[test]
    fn test_rectangle_inside_line() {
        let rect = Rectangle::new(2.0, 2.0, 6.0, 6.0);
        assert!(rectangle_line(&rect, &line(0.0, 0.0, 10.0, 10.0, 20.0)));
        assert!(rectangle_line(&rect, &line(0.0, -2.0, 8.0, 6.0, 20.0)));
    }

    #[test]
    fn test_rectangle_line_crossing_without_corners() {
        // A thin bar crossing the middle of a wide rectangle: no corner of
        // either shape lies inside the other.
        let rect = Rectangle::new(0.0, 4.0, 10.0, 2.0);
        let bar = line(5.0, -5.0, 5.0, 15.0, 1.0);
        assert!(rectangle_line(&rect, &bar));
    }

    #[test]
    fn test_dispatch_symmetry() {
        let shapes = [
            Shape::Dot(dot(1.0, 1.0)),
            Shape::Circle(circle(1.5, 1.0, 1.0)),
            Shape::Line(line(0.0, 1.0, 4.0, 1.0, 1.0)),
            Shape::Rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0)),
        ];
        for a in &shapes {
            for b in &shapes {
                assert_eq!(a.collides(b), b.collides(a), "{a:?} vs {b:?}");
            }
        }
    }
}
