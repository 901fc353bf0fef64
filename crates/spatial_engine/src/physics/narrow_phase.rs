//! Narrow-phase intersection tests
//!
//! One test per ordered pair of shape kinds, selected through a 3x3 table
//! indexed by [`ShapeKind::index`]. Mirrored cells call the same test with
//! the arguments swapped, so every test is symmetric.
//!
//! Polygons are assumed convex. Either consistent winding is accepted: the
//! outward side of each edge is derived from the sign of the polygon area.

use super::collision_hull::{HullShape, ShapeKind};
use crate::foundation::math::{constants::POSITION_EPSILON, utils, Vec2};

/// Signature shared by every cell of the dispatch table
pub type IntersectionTest = fn(&HullShape, &HullShape) -> bool;

const DISPATCH: [[IntersectionTest; ShapeKind::COUNT]; ShapeKind::COUNT] = [
    [point_point, point_circle, point_polygon],
    [circle_point, circle_circle, circle_polygon],
    [polygon_point, polygon_circle, polygon_polygon],
];

/// Whether two hull shapes overlap
pub fn intersects(a: &HullShape, b: &HullShape) -> bool {
    DISPATCH[a.kind().index()][b.kind().index()](a, b)
}

/// The table cell used for a pair of kinds
pub fn test_for(a: ShapeKind, b: ShapeKind) -> IntersectionTest {
    DISPATCH[a.index()][b.index()]
}

/// Line `a*x + b*y + c = 0` through two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLine {
    /// x coefficient
    pub a: f32,
    /// y coefficient
    pub b: f32,
    /// constant term
    pub c: f32,
}

impl EdgeLine {
    /// Line through `p0` and `p1`
    pub fn through(p0: Vec2, p1: Vec2) -> Self {
        Self {
            a: p0.y - p1.y,
            b: p1.x - p0.x,
            c: p0.x * p1.y - p1.x * p0.y,
        }
    }

    /// Signed line value at `point`
    pub fn evaluate(&self, point: Vec2) -> f32 {
        self.a * point.x + self.b * point.y + self.c
    }

    /// Line normal (not normalized)
    pub fn normal(&self) -> Vec2 {
        Vec2::new(self.a, self.b)
    }

    /// Perpendicular distance from `point`; infinite for a zero-length edge
    pub fn distance(&self, point: Vec2) -> f32 {
        let length = self.normal().norm();
        if length <= f32::EPSILON {
            return f32::INFINITY;
        }
        self.evaluate(point).abs() / length
    }
}

/// Consecutive vertex pairs, closing back to the first vertex
pub fn edges(vertices: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(&start, &end)| (start, end))
}

/// Shoelace signed area; positive for counter-clockwise winding
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    edges(vertices).map(|(start, end)| utils::perp_dot(start, end)).sum::<f32>() * 0.5
}

/// Points coincide when both coordinates differ by less than the epsilon
pub fn points_coincide(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < POSITION_EPSILON && (a.y - b.y).abs() < POSITION_EPSILON
}

/// Boundary inclusive
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    (point - center).norm() <= radius
}

/// Strict; circles that merely touch do not overlap
pub fn circles_overlap(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    (center_a - center_b).norm() < radius_a + radius_b
}

/// Point inside a convex polygon, boundary inclusive
pub fn point_in_convex_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let outward = if signed_area(vertices) > 0.0 { -1.0 } else { 1.0 };
    edges(vertices).all(|(start, end)| EdgeLine::through(start, end).evaluate(point) * outward <= 0.0)
}

/// Circle touching a polygon vertex or crossing one of its edges
///
/// A circle lying entirely inside the polygon without reaching any edge is
/// not reported.
pub fn circle_touches_polygon(center: Vec2, radius: f32, vertices: &[Vec2]) -> bool {
    edges(vertices).any(|(p1, p2)| {
        if (center - p1).norm() < radius {
            return true;
        }
        if EdgeLine::through(p1, p2).distance(center) >= radius {
            return false;
        }
        // foot of the perpendicular must land on the segment
        let along = p1 - p2;
        along.dot(&(center - p1)) * along.dot(&(center - p2)) <= 0.0
    })
}

fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    vertices.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), vertex| {
        let distance = vertex.dot(&axis);
        (min.min(distance), max.max(distance))
    })
}

fn has_separating_axis(reference: &[Vec2], other: &[Vec2]) -> bool {
    edges(reference).any(|(start, end)| {
        let axis = EdgeLine::through(start, end).normal();
        if axis.norm_squared() <= f32::EPSILON {
            return false;
        }
        let (min_a, max_a) = project(reference, axis);
        let (min_b, max_b) = project(other, axis);
        max_a < min_b || max_b < min_a
    })
}

/// Separating-axis test over both polygons' edge normals; touching counts
pub fn convex_polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.len() < 3 || b.len() < 3 {
        return false;
    }
    !has_separating_axis(a, b) && !has_separating_axis(b, a)
}

fn point_point(a: &HullShape, b: &HullShape) -> bool {
    let (HullShape::Point(a), HullShape::Point(b)) = (a, b) else {
        return false;
    };
    points_coincide(a.position(), b.position())
}

fn point_circle(a: &HullShape, b: &HullShape) -> bool {
    let (HullShape::Point(point), HullShape::Circle(circle)) = (a, b) else {
        return false;
    };
    point_in_circle(point.position(), circle.center(), circle.radius())
}

fn point_polygon(a: &HullShape, b: &HullShape) -> bool {
    let (HullShape::Point(point), HullShape::Polygon(polygon)) = (a, b) else {
        return false;
    };
    point_in_convex_polygon(point.position(), polygon.vertices())
}

fn circle_point(a: &HullShape, b: &HullShape) -> bool {
    point_circle(b, a)
}

fn circle_circle(a: &HullShape, b: &HullShape) -> bool {
    let (HullShape::Circle(a), HullShape::Circle(b)) = (a, b) else {
        return false;
    };
    circles_overlap(a.center(), a.radius(), b.center(), b.radius())
}

fn circle_polygon(a: &HullShape, b: &HullShape) -> bool {
    let (HullShape::Circle(circle), HullShape::Polygon(polygon)) = (a, b) else {
        return false;
    };
    circle_touches_polygon(circle.center(), circle.radius(), polygon.vertices())
}

fn polygon_point(a: &HullShape, b: &HullShape) -> bool {
    point_polygon(b, a)
}

fn polygon_circle(a: &HullShape, b: &HullShape) -> bool {
    circle_polygon(b, a)
}

fn polygon_polygon(a: &HullShape, b: &HullShape) -> bool {
    let (HullShape::Polygon(a), HullShape::Polygon(b)) = (a, b) else {
        return false;
    };
    convex_polygons_overlap(a.vertices(), b.vertices())
}
