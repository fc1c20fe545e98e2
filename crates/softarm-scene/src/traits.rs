//! Capabilities a drawable may offer to the editor.
//!
//! Color and selection updates go through these traits instead of
//! inspecting what kind of drawable an item is.

use softarm_ir::Rgb;

/// Something whose display color can be read and replaced.
pub trait Colorable {
    /// Current color in 0..=255 channels.
    fn color(&self) -> Rgb;

    /// Replace the color.
    fn set_color(&mut self, color: Rgb);
}

/// Something that can be highlighted as the current selection.
pub trait Selectable {
    /// Whether the item is selected.
    fn is_selected(&self) -> bool;

    /// Select or deselect the item.
    fn set_selected(&mut self, selected: bool);
}
