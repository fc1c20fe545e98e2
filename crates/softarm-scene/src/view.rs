//! Rendering-side view of one joint.

use softarm_ir::{JointId, Rgb};
use softarm_kinematics::{Chain, Result};
use softarm_math::Transform;

use crate::primitive::{Geometry, Primitive};
use crate::traits::{Colorable, Selectable};

/// Gray level of markers on the selected joint.
pub const SELECTED_MARKER_GRAY: f64 = 1.0;

/// Gray level of markers on every other joint.
pub const MARKER_GRAY: f64 = 0.5;

/// Marker spheres are slightly thinner than the joint.
pub const MARKER_RADIUS_SCALE: f64 = 0.9;

/// Height of the flat end caps drawn at the joint base and tip.
pub const CAP_HEIGHT: f64 = 1.0;

/// Owned copy of everything needed to draw a joint.
///
/// Holds world transforms by value; mutating the chain afterwards does not
/// change an existing view.
#[derive(Debug, Clone, PartialEq)]
pub struct JointView {
    /// Identity of the joint.
    pub id: JointId,
    /// Position of the joint in the chain when the view was built.
    pub index: usize,
    /// World frame where the joint begins.
    pub base: Transform,
    /// World pose of the joint tip.
    pub pose: Transform,
    /// World transform of every marker, base to tip.
    pub markers: Vec<Transform>,
    /// Joint radius.
    pub radius: f64,
    color: Rgb,
    selected: bool,
}

impl JointView {
    /// View of joint `index` of `chain`.
    pub fn from_chain(chain: &Chain, index: usize) -> Result<Self> {
        let base = chain.base_frame(index)?;
        let pose = chain.global_pose(index)?;
        let joint = &chain.joints()[index];
        let markers = joint.markers().iter().map(|m| base.then(m)).collect();
        Ok(Self {
            id: joint.id(),
            index,
            base,
            pose,
            markers,
            radius: joint.size().radius,
            color: joint.color().unwrap_or_default(),
            selected: false,
        })
    }

    /// Gray level the markers are drawn with.
    pub fn marker_gray(&self) -> f64 {
        if self.selected {
            SELECTED_MARKER_GRAY
        } else {
            MARKER_GRAY
        }
    }

    /// Base cap, tip cap and one sphere per marker.
    pub fn primitives(&self) -> Vec<Primitive> {
        let cap = Geometry::Cylinder {
            radius: self.radius,
            height: CAP_HEIGHT,
        };
        let sphere = Geometry::Sphere {
            radius: MARKER_RADIUS_SCALE * self.radius,
        };
        let gray = self.marker_gray();

        let mut out = Vec::with_capacity(self.markers.len() + 2);
        out.push(Primitive::new(cap, self.base, self.color));
        out.push(Primitive::new(cap, self.pose, self.color));
        out.extend(
            self.markers
                .iter()
                .map(|m| Primitive::gray(sphere, *m, gray)),
        );
        out
    }
}

impl Colorable for JointView {
    fn color(&self) -> Rgb {
        self.color
    }

    fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}

impl Selectable for JointView {
    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
