//! Read-only pose lookups formatted for display.

use std::fmt;

use softarm_ir::JointId;
use softarm_math::Transform;

use crate::chain::Chain;
use crate::error::Result;

/// Pose of one joint, detached from the chain it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseQuery {
    /// Position of the joint in the chain.
    pub index: usize,
    /// Identity of the joint.
    pub id: JointId,
    /// World frame where the joint begins.
    pub base: Transform,
    /// World pose of the joint tip.
    pub pose: Transform,
}

impl Chain {
    /// Look up the base frame and global pose of joint `index`.
    pub fn query(&self, index: usize) -> Result<PoseQuery> {
        let pose = self.global_pose(index)?;
        let base = self.base_frame(index)?;
        let id = self.joints()[index].id();
        Ok(PoseQuery {
            index,
            id,
            base,
            pose,
        })
    }
}

impl fmt::Display for PoseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "joint {} (id {})", self.index, self.id)?;
        write!(f, "{}", self.pose)
    }
}
