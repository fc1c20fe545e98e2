#![warn(missing_docs)]

//! Kinematic chain engine for soft continuum robots.
//!
//! A robot is an ordered chain of [`Joint`]s. Each joint bends with
//! constant curvature according to two parameters `(u, v)`; the chain
//! composes the per-joint transforms with a fixed connector offset,
//! starting from an [`AnchorPose`], to produce a world pose for every
//! joint.
//!
//! ```
//! use softarm_kinematics::{Chain, Joint};
//!
//! let mut chain = Chain::new();
//! chain.append(Joint::new(1, 5.0, 1.0));
//! chain.append(Joint::new(2, 5.0, 1.0));
//! chain.set_axis(0, 0.5, 0.0).unwrap();
//! let tip = chain.global_pose(1).unwrap();
//! assert!(tip.translation_part().norm() > 0.0);
//! ```

pub mod anchor;
pub mod chain;
pub mod error;
pub mod joint;
pub mod query;

pub use anchor::AnchorPose;
pub use chain::{compose_global_poses, Chain, ChainSnapshot, DEFAULT_CONNECTING_OFFSET};
pub use error::{ChainError, Result};
pub use joint::{
    bend_transform, sphere_count, Joint, MarkerSampling, BEND_EPSILON, MARKER_OFFSET,
    MAX_SPHERE_COUNT,
};
pub use query::PoseQuery;
