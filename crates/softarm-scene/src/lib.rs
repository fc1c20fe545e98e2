#![warn(missing_docs)]

//! Presentation layer for softarm chains.
//!
//! Decorative overlays (floor, axis markers, free-standing shapes) and the
//! joints of a [`Chain`](softarm_kinematics::Chain) are kept in separate
//! collections with their own ids. [`compose`] merges them into a single
//! [`DrawList`] when a frame is drawn.
//!
//! Joint views are owned copies of chain poses, so a renderer can hold a
//! draw list while the chain is edited.

pub mod compose;
pub mod error;
pub mod overlay;
pub mod primitive;
pub mod traits;
pub mod view;

pub use compose::{compose, DrawItem, DrawList};
pub use error::{Result, SceneError};
pub use overlay::{Overlay, OverlayId, OverlayList, Shape, ShapeKind};
pub use primitive::{Geometry, Primitive};
pub use traits::{Colorable, Selectable};
pub use view::JointView;
