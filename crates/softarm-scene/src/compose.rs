//! Merging overlays and joints into one draw order.

use log::debug;
use softarm_ir::JointId;
use softarm_kinematics::Chain;

use crate::overlay::{Overlay, OverlayId, OverlayList};
use crate::primitive::Primitive;
use crate::traits::Selectable;
use crate::view::JointView;

/// One entry of a [`DrawList`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    /// A decorative overlay.
    Overlay {
        /// Overlay identity.
        id: OverlayId,
        /// The overlay itself.
        overlay: Overlay,
    },
    /// A joint of the chain.
    Joint(JointView),
}

impl DrawItem {
    /// Primitives that draw this item.
    pub fn primitives(&self) -> Vec<Primitive> {
        match self {
            Self::Overlay { overlay, .. } => overlay.primitives(),
            Self::Joint(view) => view.primitives(),
        }
    }
}

/// Everything to draw for one frame, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    /// Overlays first, then joints base to tip.
    pub items: Vec<DrawItem>,
}

impl DrawList {
    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of overlay items preceding the joints.
    pub fn overlay_count(&self) -> usize {
        self.items
            .iter()
            .take_while(|item| matches!(item, DrawItem::Overlay { .. }))
            .count()
    }

    /// Joint views in chain order.
    pub fn joints(&self) -> impl Iterator<Item = &JointView> {
        self.items.iter().filter_map(|item| match item {
            DrawItem::Joint(view) => Some(view),
            DrawItem::Overlay { .. } => None,
        })
    }

    /// Mutable view of the joint with `id`.
    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut JointView> {
        self.items.iter_mut().find_map(|item| match item {
            DrawItem::Joint(view) if view.id == id => Some(view),
            _ => None,
        })
    }

    /// Every primitive, flattened in draw order.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.items.iter().flat_map(DrawItem::primitives).collect()
    }
}

/// Build the draw list for `chain` with `overlays` in front of it.
///
/// The joint with id `selected`, if any, is marked selected.
pub fn compose(overlays: &OverlayList, chain: &Chain, selected: Option<JointId>) -> DrawList {
    let mut items: Vec<DrawItem> = overlays
        .iter()
        .map(|(id, overlay)| DrawItem::Overlay { id, overlay })
        .collect();

    for index in 0..chain.len() {
        // index is always in range here
        if let Ok(mut view) = JointView::from_chain(chain, index) {
            view.set_selected(Some(view.id) == selected);
            items.push(DrawItem::Joint(view));
        }
    }

    debug!(
        "composed {} overlays and {} joints",
        overlays.len(),
        chain.len()
    );
    DrawList { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Shape, ShapeKind};
    use softarm_ir::{Rgb, Vec3};
    use softarm_kinematics::Joint;

    fn chain(n: u64) -> Chain {
        let mut chain = Chain::new();
        for id in 1..=n {
            chain.append(Joint::new(id, 2.0, 1.0));
        }
        chain
    }

    fn sphere() -> Shape {
        Shape {
            kind: ShapeKind::Sphere,
            size: Vec3::new(1.0, 0.0, 0.0),
            translation: Vec3::new(3.0, 3.0, 0.0),
            rotation: Vec3::default(),
            color: Rgb::new(0.0, 255.0, 0.0),
        }
    }

    #[test]
    fn test_overlays_precede_joints() {
        let mut overlays = OverlayList::with_axes();
        overlays.show_floor(true);
        overlays.add_shape(sphere()).unwrap();
        let list = compose(&overlays, &chain(3), None);
        assert_eq!(list.len(), 6);
        assert_eq!(list.overlay_count(), 3);
        let ids: Vec<JointId> = list.joints().map(|j| j.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_overlay_changes_do_not_shift_joints() {
        let chain = chain(2);
        let mut overlays = OverlayList::new();
        let before: Vec<JointView> = compose(&overlays, &chain, Some(2)).joints().cloned().collect();
        overlays.show_floor(true);
        let shape = overlays.add_shape(sphere()).unwrap();
        overlays.remove_shape(shape);
        overlays.show_axes(true);
        let after: Vec<JointView> = compose(&overlays, &chain, Some(2)).joints().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_selection_by_id() {
        let list = compose(&OverlayList::new(), &chain(3), Some(2));
        let selected: Vec<bool> = list.joints().map(|j| j.is_selected()).collect();
        assert_eq!(selected, vec![false, true, false]);

        let none = compose(&OverlayList::new(), &chain(3), Some(99));
        assert!(none.joints().all(|j| !j.is_selected()));
    }

    #[test]
    fn test_primitives_flatten_in_order() {
        let list = compose(&OverlayList::with_axes(), &chain(1), None);
        let prims = list.primitives();
        // three axis bars, two caps, two markers
        assert_eq!(prims.len(), 3 + 2 + 2);
        assert_eq!(prims[0].color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_joint_mut_recolors_view_only() {
        use crate::traits::Colorable;
        let chain = chain(2);
        let mut list = compose(&OverlayList::new(), &chain, None);
        if let Some(view) = list.joint_mut(2) {
            view.set_color(Rgb::new(10.0, 10.0, 10.0));
        }
        assert_eq!(list.joint_mut(2).map(|v| v.color()), Some(Rgb::new(10.0, 10.0, 10.0)));
        assert!(chain.joint(1).and_then(|j| j.color()).is_none());
    }
}
