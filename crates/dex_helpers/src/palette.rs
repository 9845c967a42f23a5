//! Four-shade handheld palette used by every screen.

use bevy::prelude::*;

pub const DARKEST: Color = Color::srgb(15.0 / 255.0, 56.0 / 255.0, 15.0 / 255.0);
pub const DARK: Color = Color::srgb(48.0 / 255.0, 98.0 / 255.0, 48.0 / 255.0);
pub const LIGHT: Color = Color::srgb(139.0 / 255.0, 172.0 / 255.0, 15.0 / 255.0);
pub const LIGHTEST: Color = Color::srgb(155.0 / 255.0, 188.0 / 255.0, 15.0 / 255.0);

/// Plastic around the screen
pub const SHELL: Color = Color::srgb(0.16, 0.16, 0.16);

pub const DRAG_HIGHLIGHT: Color = Color::srgba(139.0 / 255.0, 172.0 / 255.0, 15.0 / 255.0, 0.4);
