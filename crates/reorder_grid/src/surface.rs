use core::time::Duration;

use bevy::math::{Rect, Vec2};

/// How a transient offset reaches its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Jump there this frame, no animation.
    Instant,
    /// Slide from wherever the card is currently drawn.
    Animated(Duration),
}

/// What the grid controller needs from whatever draws the cards.
///
/// Bounds are in the same coordinate space as pointer positions. The layout
/// box is where the card sits in the flow; the transient offset is drawn on
/// top of it and never affects where siblings are laid out.
pub trait CardSurface<Id> {
    /// Layout box of a card, ignoring its transient offset. `None` when the
    /// card is not currently on the surface.
    fn layout_bounds(&self, card: &Id) -> Option<Rect>;

    /// Offset the card is currently drawn at, including any slide in flight.
    fn current_offset(&self, card: &Id) -> Vec2;

    fn apply_offset(&mut self, card: &Id, offset: Vec2, transition: Transition);

    /// Where the card is actually drawn right now.
    fn screen_bounds(&self, card: &Id) -> Option<Rect> {
        let layout = self.layout_bounds(card)?;
        Some(translated(layout, self.current_offset(card)))
    }
}

pub(crate) fn translated(rect: Rect, by: Vec2) -> Rect {
    Rect {
        min: rect.min + by,
        max: rect.max + by,
    }
}
