//! Recolors pixel-art sprites while keeping their shading.
//!
//! Two modes share the same backdrop handling: a single body tone applied
//! through HSL ([`tint`]), and a multi-region repaint where each pixel is
//! classified by its distance to reference swatches and scaled channel by
//! channel ([`recolor_regions`]). Both derive a fresh [`PixelBuffer`] from
//! the original and never touch it.

mod background;
mod buffer;
mod color;
mod engine;
mod error;
mod hsl;
mod plugin;
mod regions;
mod thresholds;
mod tint;

pub use background::{FALLBACK_BACKGROUND, detect_background};
pub use buffer::PixelBuffer;
pub use color::Rgb;
pub use engine::{RecolorEngine, Recipe, recolor};
pub use error::RecolorError;
pub use hsl::Hsl;
pub use plugin::{RecolorPending, RecolorPlugin, RecolorSprite, RecoloredImage, SpriteCache};
pub use regions::{ColorRegion, GeckoPalette, Region, recolor_regions, reference};
pub use thresholds::RecolorThresholds;
pub use tint::tint;

/// Body tone the beetle sprite is drawn with.
pub const DEFAULT_BEETLE_BODY: Rgb = Rgb::new(0x5c, 0x3a, 0x1e);
