//! Renderable primitives: a shape, where it sits, and its color.

use serde::{Deserialize, Serialize};
use softarm_ir::Rgb;
use softarm_math::Transform;

/// Geometry of a single primitive, centered at its local origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// Axis-aligned box with full extents.
    Box {
        /// Extent along x.
        x: f64,
        /// Extent along y.
        y: f64,
        /// Extent along z.
        z: f64,
    },
    /// Cone along +z.
    Cone {
        /// Base radius.
        radius: f64,
        /// Height.
        height: f64,
    },
    /// Cylinder along z.
    Cylinder {
        /// Radius.
        radius: f64,
        /// Height.
        height: f64,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f64,
    },
}

/// A positioned, colored piece of geometry in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    /// Shape of the primitive.
    pub geometry: Geometry,
    /// World transform of the primitive's local origin.
    pub transform: Transform,
    /// RGB color, each channel in `0.0..=1.0`.
    pub color: [f64; 3],
}

impl Primitive {
    /// Primitive with a color given in 0..=255 channels.
    pub fn new(geometry: Geometry, transform: Transform, color: Rgb) -> Self {
        Self {
            geometry,
            transform,
            color: color.normalized(),
        }
    }

    /// Primitive with a uniform gray level in `0.0..=1.0`.
    pub fn gray(geometry: Geometry, transform: Transform, level: f64) -> Self {
        Self {
            geometry,
            transform,
            color: [level; 3],
        }
    }
}
