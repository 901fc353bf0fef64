//! Math utilities and types
//!
//! Provides the 2D math types used by the spatial index and the collision
//! hulls. Affine transforms are 3x3 homogeneous matrices.

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 3x3 matrix type (2D homogeneous transform)
pub type Mat3 = Matrix3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Tolerance used when comparing point positions
    pub const POSITION_EPSILON: f32 = 0.001;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat3, Point2, Vec2};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Apply a homogeneous transform to a position
    pub fn transform_position(matrix: &Mat3, position: Vec2) -> Vec2 {
        matrix.transform_point(&Point2::from(position)).coords
    }

    /// 2D cross product (z component of the 3D cross product)
    pub fn perp_dot(a: Vec2, b: Vec2) -> f32 {
        a.x * b.y - a.y * b.x
    }
}

/// Extension trait for Mat3 with 2D transform constructors
pub trait Mat3Ext {
    /// Rotation about the origin, counter-clockwise for positive degrees
    fn rotation_z(degrees: f32) -> Mat3;

    /// Translation by an offset
    fn translation(offset: Vec2) -> Mat3;
}

impl Mat3Ext for Mat3 {
    fn rotation_z(degrees: f32) -> Mat3 {
        Mat3::new_rotation(utils::deg_to_rad(degrees))
    }

    fn translation(offset: Vec2) -> Mat3 {
        Mat3::new_translation(&offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_rotation_z_quarter_turn() {
        let rotated = utils::transform_position(&Mat3::rotation_z(90.0), Vec2::new(1.0, 0.0));
        assert_relative_eq!(rotated, Vec2::new(0.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_translation_then_rotation() {
        let matrix = Mat3::translation(Vec2::new(10.0, 0.0)) * Mat3::rotation_z(180.0);
        let moved = utils::transform_position(&matrix, Vec2::new(1.0, 0.0));
        assert_relative_eq!(moved, Vec2::new(9.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_degree_conversion_round_trip() {
        assert_relative_eq!(utils::rad_to_deg(utils::deg_to_rad(45.0)), 45.0, epsilon = EPSILON);
    }
}
