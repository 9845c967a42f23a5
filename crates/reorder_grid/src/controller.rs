//! Gesture state machine for a reorderable card grid.
//!
//! The controller never measures or draws anything itself. The host feeds it
//! pointer input plus a [`CardSurface`], and it answers with [`GridEvent`]s.
//! Time is passed in explicitly (`now`, any monotonic clock) so the long
//! press, debounce and tap suppression windows are deterministic.
//!
//! A committed swap is corrected in three steps, matching the FLIP technique:
//!
//! 1. [`ReorderController::pointer_move`] snapshots where every card is drawn
//!    and emits [`GridEvent::Reordered`].
//! 2. Once the host has laid the cards out in the new order it calls
//!    [`ReorderController::after_layout`], which offsets every displaced card
//!    back to where it was drawn, instantly.
//! 3. On the following frame [`ReorderController::animation_frame`] releases
//!    those offsets with an animated transition.

use core::fmt::Debug;
use core::time::Duration;

use bevy::math::Vec2;
use tracing::{debug, warn};

use crate::config::GridConfig;
use crate::order::move_item;
use crate::overlap::{best_candidate, projected};
use crate::surface::{CardSurface, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What the owner of the list has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent<Id> {
    DragStarted(Id),
    /// New order for the whole list. Always a permutation of the old one.
    Reordered(Vec<Id>),
    Tapped(Id),
    Dropped(Id),
    /// The drag ended without a release, e.g. the card disappeared.
    Cancelled(Id),
}

/// Shape of the current session, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    PendingLongPress,
    Dragging,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingPress<Id> {
    pub card: Id,
    pub origin: Vec2,
    /// Pointer position relative to the card's top-left at press time.
    pub grab_offset: Vec2,
    pub pressed_at: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession<Id> {
    pub dragged: Id,
    pub grab_offset: Vec2,
    pub last_pointer: Vec2,
    pub last_swap_target: Option<usize>,
    pub last_swap_at: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
enum Session<Id> {
    Idle,
    PendingLongPress(PendingPress<Id>),
    Dragging(DragSession<Id>),
}

#[derive(Debug, Clone)]
struct Flip<Id> {
    /// Where each card was drawn right before the last committed swap.
    before: Option<Vec<(Id, bevy::math::Rect)>>,
    /// Cards offset back in place this frame, released on the next one.
    settling: Vec<Id>,
}

// Below this a card is considered not to have moved
const MOVE_EPSILON: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct ReorderController<Id> {
    config: GridConfig,
    session: Session<Id>,
    suppress_taps_until: Option<Duration>,
    flip: Flip<Id>,
}

impl<Id: Clone + PartialEq + Debug> ReorderController<Id> {
    pub const fn new(config: GridConfig) -> Self {
        Self {
            config,
            session: Session::Idle,
            suppress_taps_until: None,
            flip: Flip {
                before: None,
                settling: Vec::new(),
            },
        }
    }

    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    pub const fn state(&self) -> SessionState {
        match self.session {
            Session::Idle => SessionState::Idle,
            Session::PendingLongPress(_) => SessionState::PendingLongPress,
            Session::Dragging(_) => SessionState::Dragging,
        }
    }

    pub const fn drag_session(&self) -> Option<&DragSession<Id>> {
        match &self.session {
            Session::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    pub const fn pending_press(&self) -> Option<&PendingPress<Id>> {
        match &self.session {
            Session::PendingLongPress(press) => Some(press),
            _ => None,
        }
    }

    pub fn dragged(&self) -> Option<&Id> {
        self.drag_session().map(|drag| &drag.dragged)
    }

    pub fn accepts_tap(&self, now: Duration) -> bool {
        self.suppress_taps_until.is_none_or(|until| now >= until)
    }

    /// Starts a press on `card`. Ignored for non-primary buttons, while
    /// another session is active, or when the card is not on the surface.
    pub fn pointer_down(
        &mut self,
        card: Id,
        button: PointerButton,
        point: Vec2,
        now: Duration,
        surface: &impl CardSurface<Id>,
    ) -> bool {
        if button != PointerButton::Primary || !matches!(self.session, Session::Idle) {
            return false;
        }
        let Some(bounds) = surface.screen_bounds(&card) else {
            return false;
        };
        self.session = Session::PendingLongPress(PendingPress {
            card,
            origin: point,
            grab_offset: point - bounds.min,
            pressed_at: now,
        });
        true
    }

    /// Fires the long press once it is due. `order` is the owner's current
    /// list; a card that vanished while pressed simply drops the press.
    pub fn tick(&mut self, now: Duration, order: &[Id]) -> Option<GridEvent<Id>> {
        let Session::PendingLongPress(press) = &self.session else {
            return None;
        };
        if now.saturating_sub(press.pressed_at) < self.config.long_press() {
            return None;
        }
        if !order.contains(&press.card) {
            self.session = Session::Idle;
            return None;
        }

        let press = press.clone();
        debug!("Long press on {:?}, drag started", press.card);
        self.session = Session::Dragging(DragSession {
            dragged: press.card.clone(),
            grab_offset: press.grab_offset,
            last_pointer: press.origin,
            last_swap_target: None,
            last_swap_at: None,
        });
        Some(GridEvent::DragStarted(press.card))
    }

    pub fn pointer_move(
        &mut self,
        point: Vec2,
        now: Duration,
        order: &[Id],
        surface: &mut impl CardSurface<Id>,
    ) -> Option<GridEvent<Id>> {
        match &mut self.session {
            Session::Idle => None,
            Session::PendingLongPress(press) => {
                let moved = (point - press.origin).abs();
                if moved.x > self.config.slop || moved.y > self.config.slop {
                    debug!("Press on {:?} left the slop, not a drag", press.card);
                    self.session = Session::Idle;
                }
                None
            }
            Session::Dragging(drag) => {
                let Some(from) = order.iter().position(|id| *id == drag.dragged) else {
                    warn!("Dragged card {:?} is gone, ending drag", drag.dragged);
                    let dragged = drag.dragged.clone();
                    self.session = Session::Idle;
                    return Some(GridEvent::Cancelled(dragged));
                };
                drag.last_pointer = point;

                let Some(layout) = surface.layout_bounds(&drag.dragged) else {
                    // Skip this update only, the next move may find it again
                    return None;
                };
                let top_left = point - drag.grab_offset;
                surface.apply_offset(&drag.dragged, top_left - layout.min, Transition::Instant);

                let dragged_box = projected(top_left, layout.size());
                let candidate = best_candidate(dragged_box, from, order, &*surface)?;
                if drag.last_swap_target == Some(candidate.index)
                    || !candidate.covers(self.config.swap_overlap)
                {
                    return None;
                }
                if drag
                    .last_swap_at
                    .is_some_and(|at| now.saturating_sub(at) < self.config.swap_debounce())
                {
                    return None;
                }

                let reordered = move_item(order, from, candidate.index)?;
                let snapshot = order
                    .iter()
                    .filter_map(|id| surface.screen_bounds(id).map(|bounds| (id.clone(), bounds)))
                    .collect();

                debug!(
                    "Moving {:?} from {from} to {}",
                    drag.dragged, candidate.index
                );
                drag.last_swap_target = Some(candidate.index);
                drag.last_swap_at = Some(now);
                self.flip.before = Some(snapshot);
                Some(GridEvent::Reordered(reordered))
            }
        }
    }

    /// Step two of the slide correction. Call once the cards are laid out in
    /// the order from the last [`GridEvent::Reordered`].
    pub fn after_layout(&mut self, surface: &mut impl CardSurface<Id>) {
        let Some(before) = self.flip.before.take() else {
            return;
        };
        let dragged = self.dragged().cloned();

        for (card, drawn_at) in before {
            if dragged.as_ref() == Some(&card) {
                continue;
            }
            let Some(layout) = surface.layout_bounds(&card) else {
                continue;
            };
            let inverse = drawn_at.min - layout.min;
            if inverse.length() < MOVE_EPSILON {
                continue;
            }
            surface.apply_offset(&card, inverse, Transition::Instant);
            if !self.flip.settling.contains(&card) {
                self.flip.settling.push(card);
            }
        }

        // The dragged card's slot moved under it; keep it under the pointer
        if let Session::Dragging(drag) = &self.session {
            if let Some(layout) = surface.layout_bounds(&drag.dragged) {
                let offset = drag.last_pointer - drag.grab_offset - layout.min;
                surface.apply_offset(&drag.dragged, offset, Transition::Instant);
            }
        }
    }

    /// Step three of the slide correction: release last frame's offsets.
    pub fn animation_frame(&mut self, surface: &mut impl CardSurface<Id>) {
        let settle = Transition::Animated(self.config.settle());
        for card in self.flip.settling.drain(..) {
            surface.apply_offset(&card, Vec2::ZERO, settle);
        }
    }

    pub fn pointer_up(
        &mut self,
        now: Duration,
        surface: &mut impl CardSurface<Id>,
    ) -> Option<GridEvent<Id>> {
        match core::mem::replace(&mut self.session, Session::Idle) {
            Session::Idle => None,
            Session::PendingLongPress(press) => self
                .accepts_tap(now)
                .then_some(GridEvent::Tapped(press.card)),
            Session::Dragging(drag) => {
                surface.apply_offset(
                    &drag.dragged,
                    Vec2::ZERO,
                    Transition::Animated(self.config.settle()),
                );
                self.suppress_taps_until = Some(now + self.config.tap_suppression());
                debug!("Dropped {:?}", drag.dragged);
                Some(GridEvent::Dropped(drag.dragged))
            }
        }
    }

    /// Pointer cancel: ends any session without a tap or a drop.
    pub fn cancel(&mut self, surface: &mut impl CardSurface<Id>) -> Option<GridEvent<Id>> {
        match core::mem::replace(&mut self.session, Session::Idle) {
            Session::Dragging(drag) => {
                surface.apply_offset(
                    &drag.dragged,
                    Vec2::ZERO,
                    Transition::Animated(self.config.settle()),
                );
                Some(GridEvent::Cancelled(drag.dragged))
            }
            Session::Idle | Session::PendingLongPress(_) => None,
        }
    }

    /// Forgets everything, for when the grid itself goes away.
    pub fn reset(&mut self) {
        self.session = Session::Idle;
        self.suppress_taps_until = None;
        self.flip.before = None;
        self.flip.settling.clear();
    }
}
