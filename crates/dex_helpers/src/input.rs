//! Mouse and touch folded into a single primary pointer.
//!
//! Positions are window coordinates in logical pixels, origin top-left, the
//! same space UI nodes are laid out in.

use bevy::{input::touch::Touch, prelude::*};

/// What the primary pointer did this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    Cancel,
}

pub fn just_pressed_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else if touch_input.any_just_pressed() {
        let touch = touch_input.iter_just_pressed().next()?;
        Some(touch.position())
    } else {
        None
    }
}

pub fn just_released_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_released(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else if touch_input.any_just_released() {
        let touch = touch_input.iter_just_released().next()?;
        Some(touch.position())
    } else {
        None
    }
}

/// Position of the pointer while it is held down, if it is.
pub fn held_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else {
        touch_input.iter().next().map(Touch::position)
    }
}

/// Reduces this frame's input to at most one pointer event. Presses win over
/// releases so a tap that starts and ends in the same frame still reports
/// its press first; the release is picked up on the next frame.
pub fn primary_pointer_event(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
    last_position: Option<Vec2>,
) -> Option<PointerEvent> {
    if touch_input.any_just_canceled() {
        return Some(PointerEvent::Cancel);
    }
    if let Some(position) = just_pressed_screen_position(button_input, touch_input, windows) {
        return Some(PointerEvent::Down(position));
    }
    if button_input.just_released(MouseButton::Left) || touch_input.any_just_released() {
        // A mouse released outside the window has no cursor position
        let position = just_released_screen_position(button_input, touch_input, windows)
            .or(last_position);
        return Some(position.map_or(PointerEvent::Cancel, PointerEvent::Up));
    }
    let position = held_screen_position(button_input, touch_input, windows)?;
    (last_position != Some(position)).then_some(PointerEvent::Move(position))
}
