//! Ordered joint chain and global pose propagation.
//!
//! For joint `i` the chain keeps two world transforms:
//!
//! - `base(i)`: where the joint's geometry starts. `base(0)` is the anchor,
//!   `base(i) = global(i-1) * offset` otherwise.
//! - `global(i) = base(i) * local(i)`: the joint tip.
//!
//! Any change to joint `i` invalidates `i` and every joint after it, and
//! nothing before it.

use log::debug;
use softarm_ir::{JointId, JointRecord, Rgb};
use softarm_math::Transform;

use crate::anchor::AnchorPose;
use crate::error::{ChainError, Result};
use crate::joint::{Joint, MarkerSampling};

/// Default length of the straight connector between successive joints.
pub const DEFAULT_CONNECTING_OFFSET: f64 = 1.0;

/// Owned copy of the chain's poses, safe to hand to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSnapshot {
    /// Mutation counter of the chain when the snapshot was taken.
    pub version: u64,
    /// Base frame of every joint.
    pub bases: Vec<Transform>,
    /// Global (tip) pose of every joint.
    pub poses: Vec<Transform>,
}

/// Ordered sequence of joints, base to tip, with cached global poses.
#[derive(Debug, Clone)]
pub struct Chain {
    joints: Vec<Joint>,
    bases: Vec<Transform>,
    poses: Vec<Transform>,
    anchor: AnchorPose,
    offset: Transform,
    sampling: MarkerSampling,
    version: u64,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// Empty chain anchored at the identity.
    pub fn new() -> Self {
        Self::with_connecting_offset(DEFAULT_CONNECTING_OFFSET)
    }

    /// Empty chain with a custom connector length.
    pub fn with_connecting_offset(distance: f64) -> Self {
        Self {
            joints: Vec::new(),
            bases: Vec::new(),
            poses: Vec::new(),
            anchor: AnchorPose::default(),
            offset: Transform::translation(0.0, 0.0, distance),
            sampling: MarkerSampling::default(),
            version: 0,
        }
    }

    /// Chain built from persisted records, anchored at the identity.
    pub fn from_records(records: &[JointRecord]) -> Self {
        let mut chain = Self::new();
        chain.rebuild_from_records(records);
        chain
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Add a joint at the tip.
    pub fn append(&mut self, mut joint: Joint) {
        if joint.sampling() != self.sampling {
            joint.set_sampling(self.sampling);
        }
        let index = self.joints.len();
        self.joints.push(joint);
        let base = self.base_for(index);
        self.bases.push(base);
        self.poses.push(base.then(&self.joints[index].local_transform()));
        self.version += 1;
    }

    /// Remove and drop the joint at `index`, re-anchoring every later joint.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let removed = self.joints.remove(index);
        self.bases.remove(index);
        self.poses.remove(index);
        debug!("removed joint {} at index {}", removed.id(), index);
        if index < self.joints.len() {
            self.propagate(index);
        } else {
            self.version += 1;
        }
        Ok(())
    }

    /// Replace every joint and compute all poses from the anchor outward.
    pub fn rebuild_full(&mut self, joints: Vec<Joint>) {
        self.joints = joints;
        for joint in &mut self.joints {
            if joint.sampling() != self.sampling {
                joint.set_sampling(self.sampling);
            }
        }
        let n = self.joints.len();
        self.bases = vec![Transform::identity(); n];
        self.poses = vec![Transform::identity(); n];
        self.propagate(0);
    }

    /// [`Chain::rebuild_full`] from persisted records.
    pub fn rebuild_from_records(&mut self, records: &[JointRecord]) {
        self.rebuild_full(records.iter().map(Joint::from_record).collect());
    }

    /// Recompute joint `index` and everything after it.
    ///
    /// Call after mutating a joint's local transform out of band.
    pub fn recompute_from(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.propagate(index);
        Ok(())
    }

    // =========================================================================
    // Joint edits
    // =========================================================================

    /// Set the bend of joint `index` and propagate.
    pub fn set_axis(&mut self, index: usize, u: f64, v: f64) -> Result<()> {
        self.check_index(index)?;
        self.joints[index].set_axis(u, v);
        self.propagate(index);
        Ok(())
    }

    /// Resize joint `index` and propagate.
    pub fn set_size(&mut self, index: usize, height: f64, radius: f64) -> Result<()> {
        self.check_index(index)?;
        self.joints[index].set_size(height, radius);
        self.propagate(index);
        Ok(())
    }

    /// Recolor joint `index`. Poses are unaffected.
    pub fn set_color(&mut self, index: usize, color: Rgb) -> Result<()> {
        self.check_index(index)?;
        self.joints[index].set_color(color);
        self.version += 1;
        Ok(())
    }

    /// Change the marker sampling of every joint, present and future.
    pub fn set_marker_sampling(&mut self, sampling: MarkerSampling) {
        self.sampling = sampling;
        for joint in &mut self.joints {
            joint.set_sampling(sampling);
        }
        self.version += 1;
    }

    // =========================================================================
    // Anchor and connector
    // =========================================================================

    /// Current anchor transform.
    pub fn anchor(&self) -> Transform {
        self.anchor.get()
    }

    /// Replace the anchor; every joint is recomputed.
    pub fn set_anchor(&mut self, pose: Transform) {
        self.anchor.set(pose);
        self.propagate(0);
    }

    /// Transform inserted between successive joints.
    pub fn connecting_offset(&self) -> Transform {
        self.offset
    }

    /// Change the connector length; every joint is recomputed.
    pub fn set_connecting_offset(&mut self, distance: f64) {
        self.offset = Transform::translation(0.0, 0.0, distance);
        self.propagate(0);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the chain has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joint at `index`.
    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// All joints in chain order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Current position of the joint with `id`.
    pub fn index_of(&self, id: JointId) -> Option<usize> {
        self.joints.iter().position(|j| j.id() == id)
    }

    /// Joint with `id`.
    pub fn joint_by_id(&self, id: JointId) -> Option<&Joint> {
        self.joints.iter().find(|j| j.id() == id)
    }

    /// Persisted fields of every joint, in chain order.
    pub fn records(&self) -> Vec<JointRecord> {
        self.joints.iter().map(Joint::to_record).collect()
    }

    /// Global pose of joint `index`.
    pub fn global_pose(&self, index: usize) -> Result<Transform> {
        self.check_index(index)?;
        Ok(self.poses[index])
    }

    /// World frame where joint `index` begins.
    pub fn base_frame(&self, index: usize) -> Result<Transform> {
        self.check_index(index)?;
        Ok(self.bases[index])
    }

    /// World transform of a marker on joint `index` (marker index clamps).
    pub fn marker_pose(&self, index: usize, marker: usize) -> Result<Transform> {
        self.check_index(index)?;
        Ok(self.bases[index].then(&self.joints[index].marker_transform(marker)))
    }

    /// Global poses of all joints.
    pub fn poses(&self) -> &[Transform] {
        &self.poses
    }

    /// Base frames of all joints.
    pub fn bases(&self) -> &[Transform] {
        &self.bases
    }

    /// Mutation counter, bumped by every edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Owned copy of the current poses.
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            version: self.version,
            bases: self.bases.clone(),
            poses: self.poses.clone(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_index(&self, index: usize) -> Result<()> {
        if self.joints.is_empty() {
            return Err(ChainError::Empty);
        }
        if index >= self.joints.len() {
            return Err(ChainError::IndexOutOfRange {
                index,
                len: self.joints.len(),
            });
        }
        Ok(())
    }

    fn base_for(&self, index: usize) -> Transform {
        if index == 0 {
            self.anchor.get()
        } else {
            self.poses[index - 1].then(&self.offset)
        }
    }

    fn propagate(&mut self, start: usize) {
        debug!(
            "recomputing poses from index {} ({} joints)",
            start,
            self.joints.len()
        );
        for i in start..self.joints.len() {
            let base = self.base_for(i);
            self.bases[i] = base;
            self.poses[i] = base.then(&self.joints[i].local_transform());
        }
        self.version += 1;
    }
}

/// Compute every global pose from scratch, without any cached state.
pub fn compose_global_poses(anchor: &Transform, offset: &Transform, joints: &[Joint]) -> Vec<Transform> {
    let mut poses = Vec::with_capacity(joints.len());
    let mut frame = *anchor;
    for (i, joint) in joints.iter().enumerate() {
        if i > 0 {
            frame = frame.then(offset);
        }
        frame = frame.then(&joint.local_transform());
        poses.push(frame);
    }
    poses
}

#[cfg(test)]
mod tests {
    use super::*;
    use softarm_math::{Point3, Tolerance};

    fn assert_consistent(chain: &Chain) {
        let expected = compose_global_poses(&chain.anchor(), &chain.connecting_offset(), chain.joints());
        assert_eq!(expected.len(), chain.len());
        for (i, pose) in expected.iter().enumerate() {
            let actual = chain.global_pose(i).unwrap();
            assert!(
                Tolerance::DEFAULT.transforms_equal(pose, &actual),
                "pose {i} diverged:\n{actual}\nexpected\n{pose}"
            );
        }
    }

    fn bent(id: JointId, height: f64, radius: f64, u: f64, v: f64) -> Joint {
        let mut joint = Joint::new(id, height, radius);
        joint.set_axis(u, v);
        joint
    }

    #[test]
    fn test_first_joint_seeded_by_anchor() {
        let mut chain = Chain::new();
        chain.set_anchor(Transform::translation(1.0, 2.0, 3.0));
        chain.append(Joint::new(1, 5.0, 1.0));
        let pose = chain.global_pose(0).unwrap();
        assert!(pose.max_abs_diff(&Transform::translation(1.0, 2.0, 8.0)) < 1e-12);
        assert_eq!(chain.base_frame(0).unwrap(), chain.anchor());
    }

    #[test]
    fn test_straight_chain_stacks_with_offset() {
        let mut chain = Chain::new();
        for id in 1..=3 {
            chain.append(Joint::new(id, 2.0, 0.5));
        }
        // 2 + 1 + 2 + 1 + 2
        let tip = chain.global_pose(2).unwrap().translation_part();
        assert!((tip.z - 8.0).abs() < 1e-12);
        assert_consistent(&chain);
    }

    #[test]
    fn test_edit_propagates_only_downstream() {
        let mut chain = Chain::new();
        for id in 1..=4 {
            chain.append(bent(id, 3.0, 1.0, 0.1 * id as f64, -0.05));
        }
        let before = chain.snapshot();
        chain.set_axis(2, 0.9, 0.4).unwrap();
        let after = chain.snapshot();
        assert_eq!(before.poses[0], after.poses[0]);
        assert_eq!(before.poses[1], after.poses[1]);
        assert_ne!(before.poses[2], after.poses[2]);
        assert_ne!(before.poses[3], after.poses[3]);
        assert!(after.version > before.version);
        assert_consistent(&chain);
    }

    #[test]
    fn test_remove_middle_matches_chain_built_without_it() {
        let mut chain = Chain::new();
        chain.append(bent(1, 2.0, 0.5, 0.3, 0.0));
        chain.append(bent(2, 2.0, 0.5, 0.0, 0.7));
        chain.append(bent(3, 2.0, 0.5, -0.4, 0.2));
        chain.remove(1).unwrap();

        let mut reference = Chain::new();
        reference.append(bent(1, 2.0, 0.5, 0.3, 0.0));
        reference.append(bent(3, 2.0, 0.5, -0.4, 0.2));

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.joint(1).unwrap().id(), 3);
        let diff = chain
            .global_pose(1)
            .unwrap()
            .max_abs_diff(&reference.global_pose(1).unwrap());
        assert!(diff < 1e-12);
        assert_consistent(&chain);
    }

    #[test]
    fn test_remove_first_reanchors() {
        let mut chain = Chain::new();
        chain.set_anchor(Transform::translation(0.0, 5.0, 0.0));
        chain.append(bent(1, 2.0, 1.0, 0.5, 0.5));
        chain.append(Joint::new(2, 4.0, 1.0));
        chain.remove(0).unwrap();
        assert_eq!(chain.base_frame(0).unwrap(), chain.anchor());
        let tip = chain.global_pose(0).unwrap().apply_point(&Point3::origin());
        assert!((tip - Point3::new(0.0, 5.0, 4.0)).norm() < 1e-12);
    }

    #[test]
    fn test_remove_tip_and_last() {
        let mut chain = Chain::new();
        chain.append(Joint::new(1, 2.0, 1.0));
        chain.append(Joint::new(2, 2.0, 1.0));
        chain.remove(1).unwrap();
        assert_eq!(chain.len(), 1);
        chain.remove(0).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.remove(0), Err(ChainError::Empty));
    }

    #[test]
    fn test_out_of_range_reports_failure() {
        let mut chain = Chain::new();
        assert_eq!(chain.global_pose(0), Err(ChainError::Empty));
        chain.append(Joint::new(1, 2.0, 1.0));
        assert_eq!(
            chain.global_pose(3),
            Err(ChainError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(chain.set_axis(1, 0.1, 0.1).is_err());
        assert!(chain.recompute_from(5).is_err());
    }

    #[test]
    fn test_anchor_change_moves_every_joint() {
        let mut chain = Chain::new();
        for id in 1..=3 {
            chain.append(bent(id, 2.0, 0.5, 0.2, 0.1));
        }
        let before = chain.snapshot();
        chain.set_anchor(Transform::rotation_x(0.3));
        for i in 0..3 {
            assert_ne!(before.poses[i], chain.global_pose(i).unwrap());
        }
        assert_consistent(&chain);
    }

    #[test]
    fn test_rebuild_full_from_records() {
        let mut source = Chain::new();
        source.append(bent(4, 5.0, 1.0, 0.5, 0.0));
        source.append(bent(9, 3.0, 1.0, 0.0, -0.5));
        let records = source.records();

        let mut loaded = Chain::new();
        loaded.append(Joint::new(99, 1.0, 1.0));
        loaded.rebuild_from_records(&records);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.index_of(9), Some(1));
        assert!(loaded.index_of(99).is_none());
        assert_eq!(loaded.snapshot().poses, source.snapshot().poses);
    }

    #[test]
    fn test_set_size_propagates() {
        let mut chain = Chain::new();
        chain.append(Joint::new(1, 2.0, 1.0));
        chain.append(Joint::new(2, 2.0, 1.0));
        chain.set_size(0, 6.0, 1.0).unwrap();
        let tip = chain.global_pose(1).unwrap().translation_part();
        assert!((tip.z - 9.0).abs() < 1e-12);
        assert_eq!(chain.joint(0).unwrap().sphere_count(), 6);
    }

    #[test]
    fn test_marker_pose_is_base_relative() {
        let mut chain = Chain::new();
        chain.append(Joint::new(1, 2.0, 1.0));
        chain.append(Joint::new(2, 2.0, 1.0));
        let marker = chain.marker_pose(1, 0).unwrap().translation_part();
        // base at z=3, first legacy marker at 2/2 + 0.25
        assert!((marker.z - 4.25).abs() < 1e-12);
    }

    #[test]
    fn test_custom_connecting_offset() {
        let mut chain = Chain::with_connecting_offset(0.0);
        chain.append(Joint::new(1, 2.0, 1.0));
        chain.append(Joint::new(2, 2.0, 1.0));
        assert!((chain.global_pose(1).unwrap().translation_part().z - 4.0).abs() < 1e-12);
        chain.set_connecting_offset(2.5);
        assert!((chain.global_pose(1).unwrap().translation_part().z - 6.5).abs() < 1e-12);
    }
}
