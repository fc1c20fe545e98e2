#![warn(missing_docs)]

//! Math types for the softarm kinematic engine.
//!
//! Thin wrappers around nalgebra: points, vectors, directions, a 4x4
//! affine [`Transform`] used for every pose in the chain, and tolerance
//! helpers for comparing poses.
//!
//! All transforms use the column-vector convention: `a.then(&b)` is the
//! matrix product `a * b`, so `b` acts on a point first.

use std::fmt;

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
///
/// Poses are plain values: copying a `Transform` never aliases the
/// engine's internal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Translation followed by XYZ Euler rotation given in degrees.
    ///
    /// The rotation about X acts first, then Y, then Z, then the
    /// translation: `T * Rz * Ry * Rx`.
    pub fn from_euler_degrees(translation: Vec3, rotation_deg: Vec3) -> Self {
        let rx = Self::rotation_x(rotation_deg.x.to_radians());
        let ry = Self::rotation_y(rotation_deg.y.to_radians());
        let rz = Self::rotation_z(rotation_deg.z.to_radians());
        Self::translation(translation.x, translation.y, translation.z)
            .then(&rz)
            .then(&ry)
            .then(&rx)
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Translation column of the matrix.
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// Largest absolute element-wise difference between two transforms.
    pub fn max_abs_diff(&self, other: &Transform) -> f64 {
        (self.matrix - other.matrix).amax()
    }

    /// Row-major copy of the matrix, for display surfaces.
    pub fn rows(&self) -> [[f64; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = self.matrix[(r, c)];
            }
        }
        out
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Four rows, three decimals per element, two spaces between elements.
impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(|v| format!("{v:.3}")).collect();
            write!(f, "{}", cells.join("  "))?;
        }
        Ok(())
    }
}

/// Tolerance for pose comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Element-wise tolerance for whole-matrix comparisons.
    pub matrix: f64,
}

impl Tolerance {
    /// Default tolerance, 1e-9 per matrix element.
    pub const DEFAULT: Self = Self { matrix: 1e-9 };

    /// Check if two transforms agree element-wise within tolerance.
    pub fn transforms_equal(&self, a: &Transform, b: &Transform) -> bool {
        a.max_abs_diff(b) <= self.matrix
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
