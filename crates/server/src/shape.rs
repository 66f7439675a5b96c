//! Geometric shapes stored on the board.
//!
//! Positions are glam `Vec2`s; a bare point is called a dot.

use glam::Vec2;
use std::f32::consts::TAU;

use crate::collision;

/// Room-unique identity of a shape on the board.
///
/// Handed out by a monotonic per-room counter and never reused, so a stale
/// id held by a client simply stops matching anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

/// A bare 2D point.
pub type Dot = Vec2;

/// A circle: player heads and power-up pickups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Same center, radius grown by `margin`.
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(self.center, self.radius + margin)
    }
}

/// A segment with thickness. Collides as a `length x width` rectangle
/// rotated to the segment's angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: Vec2,
    pub p2: Vec2,
    pub width: f32,
}

impl Line {
    pub fn new(p1: Vec2, p2: Vec2, width: f32) -> Self {
        Self { p1, p2, width }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.p1.distance(self.p2)
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Angle of `p1 -> p2`, normalized to `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        let d = self.p2 - self.p1;
        let angle = d.y.atan2(d.x);
        if angle < 0.0 { angle + TAU } else { angle }
    }

    /// True when the segment has no usable direction.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.length() <= f32::EPSILON
    }

    /// Express a world point in the segment's frame: x along the segment,
    /// y across it, origin at the midpoint.
    pub fn to_local(&self, point: Vec2) -> Vec2 {
        let (sin, cos) = self.angle().sin_cos();
        let d = point - self.midpoint();
        Vec2::new(cos * d.x + sin * d.y, -sin * d.x + cos * d.y)
    }

    /// Half extents of the segment's rectangle in its local frame.
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.length() * 0.5, self.width * 0.5)
    }

    /// The four corners of the thick segment, offset by half the width on
    /// each side of both endpoints.
    pub fn corners(&self) -> [Vec2; 4] {
        let dir = (self.p2 - self.p1).normalize_or_zero();
        let offset = dir.perp() * (self.width * 0.5);
        [
            self.p1 + offset,
            self.p2 + offset,
            self.p2 - offset,
            self.p1 - offset,
        ]
    }

    /// Border of the thick segment as four zero-width lines.
    pub fn edges(&self) -> [Line; 4] {
        edges_of(self.corners())
    }
}

/// An axis-aligned rectangle: the board bounds and quadtree node bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Top-left corner.
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            width,
            height,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width, self.height) * 0.5
    }

    /// Point-in-box test, edges inclusive.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Closest point of the rectangle to `point`.
    #[inline]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }

    /// True when any part of the circle lies beyond the rectangle's edges.
    pub fn is_outside(&self, circle: &Circle) -> bool {
        let (min, max) = (self.min(), self.max());
        let c = circle.center;
        let r = circle.radius;
        c.x - r < min.x || c.x + r > max.x || c.y - r < min.y || c.y + r > max.y
    }

    /// The four equal quadrants, in top-right, top-left, bottom-left,
    /// bottom-right order.
    pub fn quadrants(&self) -> [Rectangle; 4] {
        let w = self.width / 2.0;
        let h = self.height / 2.0;
        let Vec2 { x, y } = self.position;
        [
            Rectangle::new(x + w, y, w, h),
            Rectangle::new(x, y, w, h),
            Rectangle::new(x, y + h, w, h),
            Rectangle::new(x + w, y + h, w, h),
        ]
    }

    pub fn corners(&self) -> [Vec2; 4] {
        let (min, max) = (self.min(), self.max());
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }

    pub fn edges(&self) -> [Line; 4] {
        edges_of(self.corners())
    }
}

fn edges_of(corners: [Vec2; 4]) -> [Line; 4] {
    [
        Line::new(corners[0], corners[1], 0.0),
        Line::new(corners[1], corners[2], 0.0),
        Line::new(corners[2], corners[3], 0.0),
        Line::new(corners[3], corners[0], 0.0),
    ]
}

/// Any geometry the board can index or be queried with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Dot(Dot),
    Circle(Circle),
    Line(Line),
    Rectangle(Rectangle),
}

impl Shape {
    /// Symmetric overlap test.
    #[inline]
    pub fn collides(&self, other: &Shape) -> bool {
        collision::shapes_collide(self, other)
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Line> for Shape {
    fn from(line: Line) -> Self {
        Shape::Line(line)
    }
}

impl From<Rectangle> for Shape {
    fn from(rect: Rectangle) -> Self {
        Shape::Rectangle(rect)
    }
}
