//! The starting pose that places the chain base in world space.

use softarm_ir::AnchorSpec;
use softarm_math::{Transform, Vec3};

/// Base frame of the robot in world space.
///
/// Replaced wholesale, never patched. Any transform is accepted,
/// including non-rigid ones.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorPose {
    pose: Transform,
}

impl AnchorPose {
    /// Anchor at an arbitrary transform.
    pub fn new(pose: Transform) -> Self {
        Self { pose }
    }

    /// Anchor from a translation and XYZ Euler angles in degrees.
    pub fn from_spec(spec: &AnchorSpec) -> Self {
        let t = spec.translation;
        let r = spec.rotation;
        Self::new(Transform::from_euler_degrees(
            Vec3::new(t.x, t.y, t.z),
            Vec3::new(r.x, r.y, r.z),
        ))
    }

    /// Current anchor transform.
    pub fn get(&self) -> Transform {
        self.pose
    }

    /// Replace the anchor transform.
    pub fn set(&mut self, pose: Transform) {
        self.pose = pose;
    }
}
