//! Euler angle conventions.
//!
//! Stored angles are `(x, y, z)` in degrees. The matrix for a stored angle
//! triple is `Ry * Rz * Rx` (intrinsic Y-Z-X), right-handed, so a positive
//! yaw turns +X towards -Z.

use bevy::math::{EulerRot, Mat3, Quat, Vec3};

const ORDER: EulerRot = EulerRot::YZX;

/// Rotation argument accepted by the transform operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// `(x, y, z)` Euler angles
    Euler(Vec3),
    Matrix(Mat3),
    /// Rotation about the vertical axis only
    Yaw(f32),
}

impl Rotation {
    /// Rotation matrix; angles are degrees unless `radians`. Matrices are
    /// returned as-is.
    pub fn to_matrix(&self, radians: bool) -> Mat3 {
        match *self {
            Self::Euler(angles) => euler_to_matrix(angles, radians),
            Self::Matrix(matrix) => matrix,
            Self::Yaw(yaw) => Mat3::from_rotation_y(if radians { yaw } else { yaw.to_radians() }),
        }
    }
}

impl From<Vec3> for Rotation {
    fn from(angles: Vec3) -> Self {
        Self::Euler(angles)
    }
}

impl From<[f32; 3]> for Rotation {
    fn from(angles: [f32; 3]) -> Self {
        Self::Euler(Vec3::from_array(angles))
    }
}

impl From<Mat3> for Rotation {
    fn from(matrix: Mat3) -> Self {
        Self::Matrix(matrix)
    }
}

impl From<f32> for Rotation {
    fn from(yaw: f32) -> Self {
        Self::Yaw(yaw)
    }
}

pub fn euler_to_matrix(angles: Vec3, radians: bool) -> Mat3 {
    let angles = if radians {
        angles
    } else {
        Vec3::new(angles.x.to_radians(), angles.y.to_radians(), angles.z.to_radians())
    };
    Mat3::from_euler(ORDER, angles.y, angles.z, angles.x)
}

/// Decompose a rotation matrix into stored `(x, y, z)` degrees.
pub fn matrix_to_euler(matrix: Mat3) -> Vec3 {
    let (y, z, x) = Quat::from_mat3(&matrix).to_euler(ORDER);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-2;

    #[test]
    fn test_yaw_sign_convention() {
        let m = Rotation::Yaw(90.0).to_matrix(false);
        let v = m * Vec3::new(10.0, 0.0, 0.0);
        assert!(v.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), EPS), "{v:?}");
    }

    #[test]
    fn test_yaw_matches_euler_y() {
        let a = Rotation::Yaw(35.0).to_matrix(false);
        let b = Rotation::Euler(Vec3::new(0.0, 35.0, 0.0)).to_matrix(false);
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn test_radians_flag() {
        let a = Rotation::Yaw(std::f32::consts::FRAC_PI_2).to_matrix(true);
        let b = Rotation::Yaw(90.0).to_matrix(false);
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn test_euler_roundtrip() {
        for angles in [
            Vec3::new(10.0, 20.0, 30.0),
            Vec3::new(-45.0, 170.0, 5.0),
            Vec3::new(0.0, -90.0, 0.0),
            Vec3::ZERO,
        ] {
            let back = matrix_to_euler(euler_to_matrix(angles, false));
            assert!(back.abs_diff_eq(angles, EPS), "{angles:?} -> {back:?}");
        }
    }

    #[test]
    fn test_matrix_passthrough() {
        let m = Mat3::from_rotation_x(0.3);
        assert_eq!(Rotation::from(m).to_matrix(false), m);
        assert_eq!(Rotation::from(m).to_matrix(true), m);
    }
}
