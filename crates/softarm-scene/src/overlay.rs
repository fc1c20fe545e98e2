//! Decorative overlays drawn alongside the chain: floor, axis markers and
//! free-standing shapes.
//!
//! Overlays live in their own list with their own ids. They never share
//! an index space with joints; the two are merged only by
//! [`compose`](crate::compose::compose).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use softarm_ir::{Rgb, Vec3};
use softarm_math::{Transform, Vec3 as MathVec3};

use crate::error::{Result, SceneError};
use crate::primitive::{Geometry, Primitive};
use crate::traits::Colorable;

/// Side length of the square floor plate.
pub const FLOOR_EXTENT: f64 = 100.0;

/// Thickness of the floor plate; its top face sits at z = 0.
pub const FLOOR_THICKNESS: f64 = 0.5;

/// Length of each axis marker bar.
pub const AXIS_LENGTH: f64 = 25.0;

/// Cross-section of each axis marker bar.
pub const AXIS_THICKNESS: f64 = 0.5;

/// Stable identity of an overlay within an [`OverlayList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a free-standing shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Box sitting on its local origin.
    Box,
    /// Cone with its base on the local origin.
    Cone,
    /// Cylinder with its base on the local origin.
    Cylinder,
    /// Sphere resting on the local origin.
    Sphere,
}

impl ShapeKind {
    /// Lowercase name, as used on the command line and in files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Cone => "cone",
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(Self::Box),
            "cone" => Ok(Self::Cone),
            "cylinder" => Ok(Self::Cylinder),
            "sphere" => Ok(Self::Sphere),
            _ => Err(SceneError::UnknownShape(s.to_string())),
        }
    }
}

/// A free-standing decorative shape.
///
/// `size` is read per kind: a box uses all three extents; cones and
/// cylinders use `x` as height and `y` as radius; a sphere uses `x` as
/// its radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Kind of shape.
    pub kind: ShapeKind,
    /// Dimensions, interpreted per kind.
    pub size: Vec3,
    /// Position in world space.
    pub translation: Vec3,
    /// XYZ Euler rotation in degrees.
    pub rotation: Vec3,
    /// Color in 0..=255 channels.
    pub color: Rgb,
}

impl Shape {
    /// Check that the dimensions the kind uses are positive and finite.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SceneError::InvalidSize {
                    kind: self.kind.as_str(),
                    message: format!("{name} must be positive, got {value}"),
                })
            }
        };
        match self.kind {
            ShapeKind::Box => {
                check("x", self.size.x)?;
                check("y", self.size.y)?;
                check("z", self.size.z)
            }
            ShapeKind::Cone | ShapeKind::Cylinder => {
                check("height", self.size.x)?;
                check("radius", self.size.y)
            }
            ShapeKind::Sphere => check("radius", self.size.x),
        }
    }

    /// World placement of the shape's local origin.
    pub fn transform(&self) -> Transform {
        Transform::from_euler_degrees(to_math(self.translation), to_math(self.rotation))
    }

    /// The shape as a renderable primitive.
    pub fn primitive(&self) -> Primitive {
        let s = self.size;
        let (geometry, lift) = match self.kind {
            ShapeKind::Box => (
                Geometry::Box {
                    x: s.x,
                    y: s.y,
                    z: s.z,
                },
                s.z / 2.0,
            ),
            // Cone origin is a quarter of the way up from the base.
            ShapeKind::Cone => (
                Geometry::Cone {
                    radius: s.y,
                    height: s.x,
                },
                s.x / 4.0,
            ),
            ShapeKind::Cylinder => (
                Geometry::Cylinder {
                    radius: s.y,
                    height: s.x,
                },
                s.x / 2.0,
            ),
            ShapeKind::Sphere => (Geometry::Sphere { radius: s.x }, s.x),
        };
        let transform = self
            .transform()
            .then(&Transform::translation(0.0, 0.0, lift));
        Primitive::new(geometry, transform, self.color)
    }
}

impl Colorable for Shape {
    fn color(&self) -> Rgb {
        self.color
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}

fn to_math(v: Vec3) -> MathVec3 {
    MathVec3::new(v.x, v.y, v.z)
}

/// One decorative overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// Square floor plate under the origin.
    Floor,
    /// Red, green and blue bars along +x, +y and +z.
    AxisMarkers,
    /// A free-standing shape.
    Shape(Shape),
}

impl Overlay {
    /// Primitives that make up this overlay.
    pub fn primitives(&self) -> Vec<Primitive> {
        match self {
            Self::Floor => vec![Primitive::new(
                Geometry::Box {
                    x: FLOOR_EXTENT,
                    y: FLOOR_EXTENT,
                    z: FLOOR_THICKNESS,
                },
                Transform::translation(0.0, 0.0, -FLOOR_THICKNESS / 2.0),
                Rgb::new(0.0, 100.0, 255.0),
            )],
            Self::AxisMarkers => {
                let half = AXIS_LENGTH / 2.0;
                let t = AXIS_THICKNESS;
                vec![
                    Primitive::new(
                        Geometry::Box { x: AXIS_LENGTH, y: t, z: t },
                        Transform::translation(half, 0.0, 0.0),
                        Rgb::new(255.0, 0.0, 0.0),
                    ),
                    Primitive::new(
                        Geometry::Box { x: t, y: AXIS_LENGTH, z: t },
                        Transform::translation(0.0, half, 0.0),
                        Rgb::new(0.0, 255.0, 0.0),
                    ),
                    Primitive::new(
                        Geometry::Box { x: t, y: t, z: AXIS_LENGTH },
                        Transform::translation(0.0, 0.0, half),
                        Rgb::new(0.0, 0.0, 255.0),
                    ),
                ]
            }
            Self::Shape(shape) => vec![shape.primitive()],
        }
    }
}

/// The decorative overlays of a scene, in draw order: floor, shapes in
/// insertion order, then axis markers.
#[derive(Debug, Clone, Default)]
pub struct OverlayList {
    floor: Option<OverlayId>,
    axes: Option<OverlayId>,
    shapes: Vec<(OverlayId, Shape)>,
    next_id: u64,
}

impl OverlayList {
    /// Empty list: no floor, no axes, no shapes.
    pub fn new() -> Self {
        Self::default()
    }

    /// List showing the axis markers, the state of a fresh editor.
    pub fn with_axes() -> Self {
        let mut list = Self::new();
        list.show_axes(true);
        list
    }

    fn allocate(&mut self) -> OverlayId {
        self.next_id += 1;
        OverlayId(self.next_id)
    }

    /// Show or hide the floor. Showing it twice keeps the same id.
    pub fn show_floor(&mut self, show: bool) {
        match (show, self.floor) {
            (true, None) => self.floor = Some(self.allocate()),
            (false, Some(_)) => self.floor = None,
            _ => {}
        }
    }

    /// Show or hide the axis markers. Showing them twice keeps the same id.
    pub fn show_axes(&mut self, show: bool) {
        match (show, self.axes) {
            (true, None) => self.axes = Some(self.allocate()),
            (false, Some(_)) => self.axes = None,
            _ => {}
        }
    }

    /// Whether the floor is shown.
    pub fn floor_shown(&self) -> bool {
        self.floor.is_some()
    }

    /// Whether the axis markers are shown.
    pub fn axes_shown(&self) -> bool {
        self.axes.is_some()
    }

    /// Add a shape after validating its dimensions.
    pub fn add_shape(&mut self, shape: Shape) -> Result<OverlayId> {
        shape.validate()?;
        let id = self.allocate();
        self.shapes.push((id, shape));
        Ok(id)
    }

    /// Remove the shape with `id`.
    pub fn remove_shape(&mut self, id: OverlayId) -> Option<Shape> {
        let pos = self.shapes.iter().position(|(sid, _)| *sid == id)?;
        Some(self.shapes.remove(pos).1)
    }

    /// Remove the most recently added shape.
    pub fn remove_last_shape(&mut self) -> Option<(OverlayId, Shape)> {
        self.shapes.pop()
    }

    /// Shape with `id`.
    pub fn shape(&self, id: OverlayId) -> Option<&Shape> {
        self.shapes.iter().find(|(sid, _)| *sid == id).map(|(_, s)| s)
    }

    /// Mutable shape with `id`.
    pub fn shape_mut(&mut self, id: OverlayId) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, s)| s)
    }

    /// Number of free-standing shapes.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of overlays of every kind.
    pub fn len(&self) -> usize {
        self.shapes.len() + usize::from(self.floor.is_some()) + usize::from(self.axes.is_some())
    }

    /// Whether nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every overlay.
    pub fn clear(&mut self) {
        self.floor = None;
        self.axes = None;
        self.shapes.clear();
    }

    /// Overlays in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (OverlayId, Overlay)> + '_ {
        let floor = self.floor.map(|id| (id, Overlay::Floor));
        let shapes = self
            .shapes
            .iter()
            .map(|(id, shape)| (*id, Overlay::Shape(*shape)));
        let axes = self.axes.map(|id| (id, Overlay::AxisMarkers));
        floor.into_iter().chain(shapes).chain(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use softarm_math::Point3;

    fn cube(size: f64) -> Shape {
        Shape {
            kind: ShapeKind::Box,
            size: Vec3::new(size, size, size),
            translation: Vec3::default(),
            rotation: Vec3::default(),
            color: Rgb::new(255.0, 255.0, 255.0),
        }
    }

    #[test]
    fn test_draw_order_floor_shapes_axes() {
        let mut list = OverlayList::new();
        list.show_axes(true);
        let a = list.add_shape(cube(1.0)).unwrap();
        list.show_floor(true);
        let b = list.add_shape(cube(2.0)).unwrap();

        let order: Vec<Overlay> = list.iter().map(|(_, o)| o).collect();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], Overlay::Floor);
        assert!(matches!(order[1], Overlay::Shape(s) if s.size.x == 1.0));
        assert!(matches!(order[2], Overlay::Shape(s) if s.size.x == 2.0));
        assert_eq!(order[3], Overlay::AxisMarkers);

        let ids: Vec<OverlayId> = list.iter().map(|(id, _)| id).collect();
        assert_eq!(ids[1], a);
        assert_eq!(ids[2], b);
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let mut list = OverlayList::new();
        list.show_floor(true);
        let first = list.iter().next().map(|(id, _)| id);
        list.show_floor(true);
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().map(|(id, _)| id), first);
        list.show_floor(false);
        list.show_floor(false);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_shape_keeps_other_ids() {
        let mut list = OverlayList::with_axes();
        let a = list.add_shape(cube(1.0)).unwrap();
        let b = list.add_shape(cube(2.0)).unwrap();
        let c = list.add_shape(cube(3.0)).unwrap();
        assert!(list.remove_shape(b).is_some());
        assert!(list.remove_shape(b).is_none());
        assert_eq!(list.shape(a).map(|s| s.size.x), Some(1.0));
        assert_eq!(list.shape(c).map(|s| s.size.x), Some(3.0));
        assert_eq!(list.remove_last_shape().map(|(id, _)| id), Some(c));
        assert_eq!(list.shape_count(), 1);
        assert!(list.axes_shown());
    }

    #[test]
    fn test_invalid_shape_rejected() {
        let mut list = OverlayList::new();
        let mut bad = cube(1.0);
        bad.size.z = 0.0;
        assert!(matches!(
            list.add_shape(bad),
            Err(SceneError::InvalidSize { kind: "box", .. })
        ));
        let sphere = Shape {
            kind: ShapeKind::Sphere,
            size: Vec3::new(2.0, 0.0, 0.0),
            ..cube(1.0)
        };
        assert!(list.add_shape(sphere).is_ok());
    }

    #[test]
    fn test_shape_kind_parse() {
        assert_eq!("Cylinder".parse::<ShapeKind>().unwrap(), ShapeKind::Cylinder);
        assert_eq!(" cone ".parse::<ShapeKind>().unwrap(), ShapeKind::Cone);
        assert_eq!(
            "torus".parse::<ShapeKind>(),
            Err(SceneError::UnknownShape("torus".into()))
        );
        assert_eq!(ShapeKind::Sphere.to_string(), "sphere");
    }

    #[test]
    fn test_shapes_rest_on_their_origin() {
        let box_shape = Shape {
            translation: Vec3::new(5.0, 0.0, 0.0),
            ..cube(2.0)
        };
        let center = box_shape.primitive().transform.apply_point(&Point3::origin());
        assert_relative_eq!(center.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(center.z, 1.0, epsilon = 1e-12);

        let sphere = Shape {
            kind: ShapeKind::Sphere,
            size: Vec3::new(3.0, 0.0, 0.0),
            ..cube(1.0)
        };
        let p = sphere.primitive();
        assert_eq!(p.geometry, Geometry::Sphere { radius: 3.0 });
        assert_relative_eq!(p.transform.translation_part().z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotated_shape_lifts_along_its_own_axis() {
        let cylinder = Shape {
            kind: ShapeKind::Cylinder,
            size: Vec3::new(4.0, 1.0, 0.0),
            rotation: Vec3::new(90.0, 0.0, 0.0),
            ..cube(1.0)
        };
        let center = cylinder.primitive().transform.translation_part();
        // rotated 90 about x: local +z points along world -y
        assert_relative_eq!(center.y, -2.0, epsilon = 1e-12);
        assert!(center.z.abs() < 1e-12);
    }

    #[test]
    fn test_axis_markers_colors() {
        let prims = Overlay::AxisMarkers.primitives();
        assert_eq!(prims.len(), 3);
        assert_eq!(prims[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(prims[1].color, [0.0, 1.0, 0.0]);
        assert_eq!(prims[2].color, [0.0, 0.0, 1.0]);
        assert_relative_eq!(prims[2].transform.translation_part().z, 12.5);
    }

    #[test]
    fn test_shape_is_colorable() {
        let mut list = OverlayList::new();
        let id = list.add_shape(cube(1.0)).unwrap();
        if let Some(shape) = list.shape_mut(id) {
            shape.set_color(Rgb::new(1.0, 2.0, 3.0));
        }
        assert_eq!(list.shape(id).map(Colorable::color), Some(Rgb::new(1.0, 2.0, 3.0)));
    }
}
