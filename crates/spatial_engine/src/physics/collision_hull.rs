//! Collision hull variants
//!
//! Every hull keeps its immutable *initial* geometry next to the *current*
//! one. Absolute moves and rotations, and matrix transforms, are always
//! recomputed from the initial geometry; relative ones build on the current
//! geometry. Rotations pivot on the world origin.

use crate::foundation::math::{utils, Mat3, Mat3Ext, Vec2};

/// Caller-assigned hull identity (positive)
pub type HullId = u32;

/// Collision group tag (positive); hulls sharing a group never collide
pub type CollisionGroup = u32;

/// Closed set of hull shapes, used to index the narrow-phase table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Single point
    Point = 0,
    /// Circle with a radius
    Circle = 1,
    /// Convex polygon
    Polygon = 2,
}

impl ShapeKind {
    /// Number of shape kinds
    pub const COUNT: usize = 3;

    /// Row/column of this kind in the dispatch table
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A point hull
#[derive(Debug, Clone, PartialEq)]
pub struct PointHull {
    initial_position: Vec2,
    current_position: Vec2,
}

impl PointHull {
    /// Creates a point hull at `position`
    pub fn new(position: Vec2) -> Self {
        Self {
            initial_position: position,
            current_position: position,
        }
    }

    /// Current position
    pub fn position(&self) -> Vec2 {
        self.current_position
    }

    /// Position given at construction
    pub fn initial_position(&self) -> Vec2 {
        self.initial_position
    }

    /// Translate by `offset`
    pub fn move_object(&mut self, offset: Vec2, absolute: bool) {
        let base = if absolute { self.initial_position } else { self.current_position };
        self.current_position = base + offset;
    }

    /// Rotate about the origin by `degrees`
    pub fn rotate_object(&mut self, degrees: f32, absolute: bool) {
        let base = if absolute { self.initial_position } else { self.current_position };
        self.current_position = utils::transform_position(&Mat3::rotation_z(degrees), base);
    }

    /// Replace the current position with the transformed initial one
    pub fn transform_object(&mut self, matrix: &Mat3) {
        self.current_position = utils::transform_position(matrix, self.initial_position);
    }
}

/// A circle hull; moves like a point, the radius never changes
#[derive(Debug, Clone, PartialEq)]
pub struct CircleHull {
    center: PointHull,
    radius: f32,
}

impl CircleHull {
    /// Creates a circle hull
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center: PointHull::new(center),
            radius,
        }
    }

    /// Current center
    pub fn center(&self) -> Vec2 {
        self.center.position()
    }

    /// Radius
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// A convex polygon hull with a fixed vertex count
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonHull {
    initial_vertices: Vec<Vec2>,
    current_vertices: Vec<Vec2>,
    initial_centroid: Vec2,
    current_centroid: Vec2,
}

impl PolygonHull {
    /// Creates a polygon hull; the vertices should describe a convex polygon
    pub fn new(vertices: Vec<Vec2>) -> Self {
        let centroid = vertex_mean(&vertices);
        Self {
            current_vertices: vertices.clone(),
            initial_vertices: vertices,
            initial_centroid: centroid,
            current_centroid: centroid,
        }
    }

    /// Current vertices
    pub fn vertices(&self) -> &[Vec2] {
        &self.current_vertices
    }

    /// Vertices given at construction
    pub fn initial_vertices(&self) -> &[Vec2] {
        &self.initial_vertices
    }

    /// Mean of the current vertices
    pub fn centroid(&self) -> Vec2 {
        self.current_centroid
    }

    fn apply(&mut self, absolute: bool, map: impl Fn(Vec2) -> Vec2) {
        let sources = if absolute { &self.initial_vertices } else { &self.current_vertices };
        let moved: Vec<Vec2> = sources.iter().map(|&vertex| map(vertex)).collect();
        self.current_vertices = moved;

        let centroid = if absolute { self.initial_centroid } else { self.current_centroid };
        self.current_centroid = map(centroid);
    }

    /// Translate every vertex by `offset`
    pub fn move_object(&mut self, offset: Vec2, absolute: bool) {
        self.apply(absolute, |vertex| vertex + offset);
    }

    /// Rotate every vertex about the origin by `degrees`
    pub fn rotate_object(&mut self, degrees: f32, absolute: bool) {
        let rotation = Mat3::rotation_z(degrees);
        self.apply(absolute, |vertex| utils::transform_position(&rotation, vertex));
    }

    /// Replace the current vertices with the transformed initial ones
    pub fn transform_object(&mut self, matrix: &Mat3) {
        self.apply(true, |vertex| utils::transform_position(matrix, vertex));
    }
}

fn vertex_mean(vertices: &[Vec2]) -> Vec2 {
    if vertices.is_empty() {
        return Vec2::zeros();
    }
    vertices.iter().sum::<Vec2>() / vertices.len() as f32
}

/// Geometry of a hull
#[derive(Debug, Clone, PartialEq)]
pub enum HullShape {
    /// Point hull
    Point(PointHull),
    /// Circle hull
    Circle(CircleHull),
    /// Polygon hull
    Polygon(PolygonHull),
}

impl HullShape {
    /// Shape tag
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Point(_) => ShapeKind::Point,
            Self::Circle(_) => ShapeKind::Circle,
            Self::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Position used for broad-phase placement
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Point(point) => point.position(),
            Self::Circle(circle) => circle.center(),
            Self::Polygon(polygon) => polygon.centroid(),
        }
    }

    /// Translate the shape
    pub fn move_object(&mut self, offset: Vec2, absolute: bool) {
        match self {
            Self::Point(point) => point.move_object(offset, absolute),
            Self::Circle(circle) => circle.center.move_object(offset, absolute),
            Self::Polygon(polygon) => polygon.move_object(offset, absolute),
        }
    }

    /// Rotate the shape about the origin
    pub fn rotate_object(&mut self, degrees: f32, absolute: bool) {
        match self {
            Self::Point(point) => point.rotate_object(degrees, absolute),
            Self::Circle(circle) => circle.center.rotate_object(degrees, absolute),
            Self::Polygon(polygon) => polygon.rotate_object(degrees, absolute),
        }
    }

    /// Transform the initial geometry into the current one
    pub fn transform_object(&mut self, matrix: &Mat3) {
        match self {
            Self::Point(point) => point.transform_object(matrix),
            Self::Circle(circle) => circle.center.transform_object(matrix),
            Self::Polygon(polygon) => polygon.transform_object(matrix),
        }
    }
}

/// A registered hull: identity, group and geometry
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionHull {
    id: HullId,
    group: CollisionGroup,
    shape: HullShape,
}

impl CollisionHull {
    /// Creates a hull
    pub fn new(id: HullId, group: CollisionGroup, shape: HullShape) -> Self {
        Self { id, group, shape }
    }

    /// Hull id
    pub fn id(&self) -> HullId {
        self.id
    }

    /// Collision group
    pub fn group(&self) -> CollisionGroup {
        self.group
    }

    /// Shape tag
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Geometry
    pub fn shape(&self) -> &HullShape {
        &self.shape
    }

    /// Current position (center or centroid)
    pub fn position(&self) -> Vec2 {
        self.shape.position()
    }

    /// Translate the hull
    pub fn move_object(&mut self, offset: Vec2, absolute: bool) {
        self.shape.move_object(offset, absolute);
    }

    /// Rotate the hull about the origin
    pub fn rotate_object(&mut self, degrees: f32, absolute: bool) {
        self.shape.rotate_object(degrees, absolute);
    }

    /// Transform the hull's initial geometry
    pub fn transform_object(&mut self, matrix: &Mat3) {
        self.shape.transform_object(matrix);
    }
}
