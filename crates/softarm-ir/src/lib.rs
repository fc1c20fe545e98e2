//! Plain data records for the softarm ecosystem.
//!
//! These types are the exchange format between the kinematic engine and
//! its persistence collaborators. They carry no derived state: a
//! [`JointRecord`] holds exactly what a joints file stores, and the
//! engine rebuilds transforms from it.

use serde::{Deserialize, Serialize};

/// Unique identifier of a joint, assigned monotonically by the editor.
pub type JointId = u64;

/// 3D vector with f64 components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// RGB color with channels in 0..=255, stored as reals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub red: f64,
    /// Green channel.
    pub green: f64,
    /// Blue channel.
    pub blue: f64,
}

impl Rgb {
    /// Create a color from its three channels.
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Channels scaled to 0.0..=1.0 for renderers.
    pub fn normalized(&self) -> [f64; 3] {
        [self.red / 255.0, self.green / 255.0, self.blue / 255.0]
    }
}

/// Physical size of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSize {
    /// Rest length along the local z-axis.
    pub height: f64,
    /// Radius of the segment.
    pub radius: f64,
}

impl JointSize {
    /// Create a size from height and radius.
    pub fn new(height: f64, radius: f64) -> Self {
        Self { height, radius }
    }
}

/// Two-axis bend parameters of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BendAxis {
    /// Curvature component producing rotation about local x.
    pub u: f64,
    /// Curvature component producing rotation about local y.
    pub v: f64,
}

impl BendAxis {
    /// Create a bend from its two components.
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// One persisted joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRecord {
    /// Joint identity.
    pub id: JointId,
    /// Display color.
    pub color: Rgb,
    /// Height and radius.
    pub size: JointSize,
    /// Bend parameters.
    pub axis: BendAxis,
}

/// Externally authored anchor: translation plus XYZ Euler rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorSpec {
    /// Base position in world space.
    pub translation: Vec3,
    /// Rotation angles in degrees (applied as X, then Y, then Z).
    pub rotation: Vec3,
}

/// A softarm document, the `.json` session format.
///
/// Unlike the XML joints file, the document also keeps the anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string (e.g. "0.1").
    pub version: String,
    /// Joints in chain order, base to tip.
    pub joints: Vec<JointRecord>,
    /// Starting pose of the chain, if one was set.
    #[serde(default)]
    pub anchor: Option<AnchorSpec>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            joints: Vec::new(),
            anchor: None,
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
