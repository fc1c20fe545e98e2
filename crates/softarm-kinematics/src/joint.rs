//! A single continuum segment and its constant-curvature bending transform.

use log::warn;
use serde::{Deserialize, Serialize};
use softarm_ir::{BendAxis, JointId, JointRecord, JointSize, Rgb};
use softarm_math::{Dir3, Transform, Vec3};

/// Bend magnitudes below this are treated as a straight segment.
pub const BEND_EPSILON: f64 = 1e-6;

/// Fixed extra length added to every legacy marker sample.
pub const MARKER_OFFSET: f64 = 0.25;

/// Upper bound on markers per joint. Longer or thinner joints are
/// sampled at this many points.
pub const MAX_SPHERE_COUNT: usize = 10_000;

/// Where along a joint the discretization markers are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSampling {
    /// `L_i = H*i/n + H/n + 0.25`. Does not span `[0, H]` evenly; kept
    /// so existing chains keep their marker layout.
    #[default]
    Legacy,
    /// `L_i = H*(i+1)/n`, ending exactly at the tip.
    Uniform,
}

impl MarkerSampling {
    /// Evaluation length of marker `index` out of `count` on a joint of `height`.
    pub fn length(&self, height: f64, index: usize, count: usize) -> f64 {
        let n = count as f64;
        let i = index as f64;
        match self {
            Self::Legacy => height * i / n + height / n + MARKER_OFFSET,
            Self::Uniform => height * (i + 1.0) / n,
        }
    }
}

/// Number of markers for a joint: `max(1, floor(height / radius))`,
/// capped at [`MAX_SPHERE_COUNT`].
///
/// Non-positive radius or a non-finite ratio yields 1.
pub fn sphere_count(height: f64, radius: f64) -> usize {
    if radius <= 0.0 {
        return 1;
    }
    let ratio = height / radius;
    if !ratio.is_finite() || ratio < 1.0 {
        return 1;
    }
    ratio.floor().min(MAX_SPHERE_COUNT as f64) as usize
}

/// Constant-curvature transform of a segment of rest length `height`
/// bent by `(u, v)`, evaluated at arc length `length`.
///
/// The bend parameters scale with `length / height`, so markers along the
/// joint lie on the same arc as its tip. The result maps tip-frame
/// coordinates into the base frame: rotate by `phi` about `(u, v, 0)`,
/// then translate to the arc end point.
pub fn bend_transform(height: f64, u: f64, v: f64, length: f64) -> Transform {
    let scale = length / height;
    let u = u * scale;
    let v = v * scale;
    let phi = (u * u + v * v).sqrt();

    if phi.is_nan() || phi.abs() < BEND_EPSILON {
        return Transform::translation(0.0, 0.0, length);
    }

    let (sp, cp) = phi.sin_cos();
    let sigma = cp - 1.0;
    let u_hat = u / phi;
    let v_hat = v / phi;
    let x = 1.0 / (u.abs() + v.abs());

    let axis = Dir3::new_normalize(Vec3::new(u * x, v * x, 0.0));
    let rotation = Transform::rotation_about_axis(&axis, phi);
    let offset = Transform::translation(
        -sigma * length * v_hat / phi,
        sigma * length * u_hat / phi,
        length * sp / phi,
    );
    offset.then(&rotation)
}

/// One continuum segment of the robot.
///
/// The local transform and the marker transforms are derived state: every
/// mutation of axis or size rebuilds all of them.
#[derive(Debug, Clone)]
pub struct Joint {
    id: JointId,
    height: f64,
    radius: f64,
    bend_u: f64,
    bend_v: f64,
    color: Option<Rgb>,
    sampling: MarkerSampling,
    sphere_count: usize,
    local: Transform,
    markers: Vec<Transform>,
}

impl Joint {
    /// Create a straight joint.
    pub fn new(id: JointId, height: f64, radius: f64) -> Self {
        let mut joint = Self {
            id,
            height,
            radius,
            bend_u: 0.0,
            bend_v: 0.0,
            color: None,
            sampling: MarkerSampling::default(),
            sphere_count: sphere_count(height, radius),
            local: Transform::identity(),
            markers: Vec::new(),
        };
        joint.update_transforms();
        joint
    }

    /// Build a joint from a persisted record.
    pub fn from_record(record: &JointRecord) -> Self {
        let mut joint = Self::new(record.id, record.size.height, record.size.radius);
        joint.color = Some(record.color);
        joint.set_axis(record.axis.u, record.axis.v);
        joint
    }

    /// Export the persisted fields. An unset color is written as black.
    pub fn to_record(&self) -> JointRecord {
        JointRecord {
            id: self.id,
            color: self.color.unwrap_or_default(),
            size: self.size(),
            axis: self.axis(),
        }
    }

    /// Builder form of [`Joint::set_sampling`].
    pub fn with_sampling(mut self, sampling: MarkerSampling) -> Self {
        self.set_sampling(sampling);
        self
    }

    /// Joint identity.
    pub fn id(&self) -> JointId {
        self.id
    }

    /// Replace the joint identity.
    pub fn set_id(&mut self, id: JointId) {
        self.id = id;
    }

    /// Current bend parameters.
    pub fn axis(&self) -> BendAxis {
        BendAxis::new(self.bend_u, self.bend_v)
    }

    /// Set the bend parameters and rebuild every transform.
    ///
    /// No bounds are enforced. Magnitudes far beyond `2π` wrap the arc
    /// around itself and make the pose numerically meaningless.
    pub fn set_axis(&mut self, u: f64, v: f64) {
        self.bend_u = u;
        self.bend_v = v;
        self.update_transforms();
    }

    /// Current height and radius.
    pub fn size(&self) -> JointSize {
        JointSize::new(self.height, self.radius)
    }

    /// Resize the joint. The marker list is reallocated for the new count.
    pub fn set_size(&mut self, height: f64, radius: f64) {
        self.height = height;
        self.radius = radius;
        self.sphere_count = sphere_count(height, radius);
        self.markers = Vec::with_capacity(self.sphere_count);
        self.update_transforms();
    }

    /// Display color, if one has been set.
    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    /// Set the display color. Does not touch any transform.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = Some(color);
    }

    /// Marker sampling policy in use.
    pub fn sampling(&self) -> MarkerSampling {
        self.sampling
    }

    /// Change the marker sampling policy and rebuild the markers.
    pub fn set_sampling(&mut self, sampling: MarkerSampling) {
        self.sampling = sampling;
        self.update_transforms();
    }

    /// Number of discretization markers, always at least 1.
    pub fn sphere_count(&self) -> usize {
        self.sphere_count
    }

    /// Tip-relative-to-base transform of the whole joint.
    pub fn local_transform(&self) -> Transform {
        self.local
    }

    /// Transform of marker `index` relative to the joint base.
    ///
    /// Indices past the last marker return the last marker.
    pub fn marker_transform(&self, index: usize) -> Transform {
        let last = self.sphere_count - 1;
        if index > last {
            warn!(
                "joint {}: marker index {} clamped to {}",
                self.id, index, last
            );
        }
        self.markers[index.min(last)]
    }

    /// All marker transforms, base to tip.
    pub fn markers(&self) -> &[Transform] {
        &self.markers
    }

    fn update_transforms(&mut self) {
        let (h, u, v) = (self.height, self.bend_u, self.bend_v);
        let n = self.sphere_count;
        self.local = bend_transform(h, u, v, h);
        self.markers.clear();
        self.markers.extend(
            (0..n).map(|i| bend_transform(h, u, v, self.sampling.length(h, i, n))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use softarm_math::Point3;

    #[test]
    fn test_straight_joint_is_pure_translation() {
        let joint = Joint::new(1, 5.0, 1.0);
        assert_eq!(joint.sphere_count(), 5);
        let expected = Transform::translation(0.0, 0.0, 5.0);
        assert!(joint.local_transform().max_abs_diff(&expected) < 1e-12);
    }

    #[test]
    fn test_straight_translation_ignores_radius() {
        for radius in [0.1, 1.0, 3.0, 10.0] {
            let joint = Joint::new(1, 4.0, radius);
            let t = joint.local_transform();
            assert!(t.max_abs_diff(&Transform::translation(0.0, 0.0, 4.0)) < 1e-12);
        }
    }

    #[test]
    fn test_bend_u_rotates_about_x() {
        let mut joint = Joint::new(1, 5.0, 1.0);
        joint.set_axis(0.5, 0.0);
        let t = joint.local_transform();
        let expected_rotation = Transform::rotation_x(0.5);
        for r in 0..3 {
            for c in 0..3 {
                assert_relative_eq!(
                    t.matrix[(r, c)],
                    expected_rotation.matrix[(r, c)],
                    epsilon = 1e-12
                );
            }
        }
        let p = t.translation_part();
        assert!(p.x.abs() < 1e-12);
        assert_relative_eq!(p.y, (0.5f64.cos() - 1.0) * 5.0 / 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.z, 5.0 * 0.5f64.sin() / 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_bend_v_rotates_about_y() {
        let mut joint = Joint::new(1, 5.0, 1.0);
        joint.set_axis(0.0, 0.5);
        let t = joint.local_transform();
        let rot_only = Transform {
            matrix: {
                let mut m = t.matrix;
                m[(0, 3)] = 0.0;
                m[(1, 3)] = 0.0;
                m[(2, 3)] = 0.0;
                m
            },
        };
        assert!(rot_only.max_abs_diff(&Transform::rotation_y(0.5)) < 1e-12);
        let p = t.translation_part();
        assert!(p.x > 0.0);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z > 0.0);
    }

    #[test]
    fn test_tip_stays_on_arc() {
        // The tip tangent is the rotated z-axis and the chord matches the arc.
        let (h, u, v) = (3.0, 0.8, -0.6);
        let t = bend_transform(h, u, v, h);
        let phi = (u * u + v * v).sqrt();
        let chord = t.apply_point(&Point3::origin()).coords.norm();
        assert_relative_eq!(chord, 2.0 * h / phi * (phi / 2.0).sin(), epsilon = 1e-12);

        // z component of the rotated z-axis
        let tangent_z = t.matrix[(2, 2)];
        assert_relative_eq!(tangent_z.acos(), phi, epsilon = 1e-12);
    }

    #[test]
    fn test_markers_share_the_tip_arc() {
        let mut joint = Joint::new(1, 4.0, 1.0).with_sampling(MarkerSampling::Uniform);
        joint.set_axis(0.4, 0.3);
        let last = joint.marker_transform(joint.sphere_count() - 1);
        assert!(last.max_abs_diff(&joint.local_transform()) < 1e-12);
    }

    #[test]
    fn test_legacy_sampling_lengths() {
        let s = MarkerSampling::Legacy;
        assert_relative_eq!(s.length(5.0, 0, 5), 1.25);
        assert_relative_eq!(s.length(5.0, 4, 5), 5.25);
        let joint = Joint::new(1, 5.0, 1.0);
        let first = joint.marker_transform(0);
        assert!(first.max_abs_diff(&Transform::translation(0.0, 0.0, 1.25)) < 1e-12);
    }

    #[test]
    fn test_sphere_count_floor() {
        assert_eq!(sphere_count(5.0, 1.0), 5);
        assert_eq!(sphere_count(5.5, 1.0), 5);
        assert_eq!(sphere_count(2.0, 0.5), 4);
        assert_eq!(sphere_count(0.5, 1.0), 1);
        assert_eq!(sphere_count(5.0, 0.0), 1);
        assert_eq!(sphere_count(5.0, -2.0), 1);
        assert_eq!(sphere_count(f64::NAN, 1.0), 1);
        assert_eq!(sphere_count(1e18, 1.0), MAX_SPHERE_COUNT);
        assert_eq!(sphere_count(100.0, 1e-9), MAX_SPHERE_COUNT);
    }

    #[test]
    fn test_extreme_ratio_is_capped() {
        let joint = Joint::new(1, 1e18, 1.0);
        assert_eq!(joint.sphere_count(), MAX_SPHERE_COUNT);
        assert_eq!(joint.markers().len(), MAX_SPHERE_COUNT);
    }

    #[test]
    fn test_marker_index_clamps() {
        let joint = Joint::new(1, 3.0, 1.0);
        assert_eq!(joint.marker_transform(10), joint.marker_transform(2));
    }

    #[test]
    fn test_set_size_reallocates_markers() {
        let mut joint = Joint::new(1, 5.0, 1.0);
        joint.set_axis(0.3, 0.1);
        joint.set_size(2.0, 1.0);
        assert_eq!(joint.sphere_count(), 2);
        assert_eq!(joint.markers().len(), 2);
        assert!(joint
            .local_transform()
            .max_abs_diff(&bend_transform(2.0, 0.3, 0.1, 2.0))
            < 1e-12);
    }

    #[test]
    fn test_record_round_trip() {
        let record = JointRecord {
            id: 7,
            color: Rgb::new(255.0, 128.0, 0.0),
            size: JointSize::new(6.0, 1.5),
            axis: BendAxis::new(-0.2, 1.1),
        };
        let joint = Joint::from_record(&record);
        assert_eq!(joint.sphere_count(), 4);
        assert_eq!(joint.to_record(), record);
    }

    #[test]
    fn test_unset_color_exports_black() {
        let joint = Joint::new(2, 5.0, 1.0);
        assert!(joint.color().is_none());
        assert_eq!(joint.to_record().color, Rgb::default());
    }
}
