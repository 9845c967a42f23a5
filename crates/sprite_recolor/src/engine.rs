use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::regions::{GeckoPalette, recolor_regions};
use crate::thresholds::RecolorThresholds;
use crate::tint::tint;

/// How a sprite should be repainted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Recipe {
    /// Show the sprite as drawn.
    #[default]
    Original,
    /// One body tone, shading kept through lightness.
    Tint(Rgb),
    /// Skin, dots, belly and eyes painted separately.
    Regions(GeckoPalette),
}

/// Applies `recipe` to a copy of `original`.
pub fn recolor(
    original: &PixelBuffer,
    recipe: &Recipe,
    thresholds: &RecolorThresholds,
) -> PixelBuffer {
    match recipe {
        Recipe::Original => original.clone(),
        Recipe::Tint(target) => tint(original, *target, thresholds),
        Recipe::Regions(palette) if palette.is_unchanged() => original.clone(),
        Recipe::Regions(palette) => recolor_regions(original, palette, thresholds),
    }
}

/// Holds a sprite's original pixels and derives recolored copies from them.
#[derive(Debug, Clone, Default)]
pub struct RecolorEngine {
    original: Option<PixelBuffer>,
    thresholds: RecolorThresholds,
}

impl RecolorEngine {
    pub const fn new(thresholds: RecolorThresholds) -> Self {
        Self {
            original: None,
            thresholds,
        }
    }

    /// Caches the original. Only the first buffer sticks; returns whether
    /// this call stored it.
    pub fn load(&mut self, original: PixelBuffer) -> bool {
        if self.original.is_some() {
            return false;
        }
        debug!(
            "Cached {}x{} sprite for recoloring",
            original.width(),
            original.height()
        );
        self.original = Some(original);
        true
    }

    pub const fn original(&self) -> Option<&PixelBuffer> {
        self.original.as_ref()
    }

    pub const fn thresholds(&self) -> &RecolorThresholds {
        &self.thresholds
    }

    /// `None` until a sprite is loaded.
    pub fn render(&self, recipe: &Recipe) -> Option<PixelBuffer> {
        let original = self.original.as_ref()?;
        Some(recolor(original, recipe, &self.thresholds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_engine_renders_nothing() {
        let engine = RecolorEngine::default();
        assert_eq!(engine.render(&Recipe::Tint(Rgb::new(255, 0, 0))), None);
    }

    #[test]
    fn first_original_wins() {
        let mut engine = RecolorEngine::default();
        let first = PixelBuffer::new(1, 1, vec![1, 1, 1, 255]).unwrap();
        let second = PixelBuffer::new(1, 1, vec![2, 2, 2, 255]).unwrap();
        assert!(engine.load(first.clone()));
        assert!(!engine.load(second));
        assert_eq!(engine.original(), Some(&first));
        assert_eq!(engine.render(&Recipe::Original), Some(first));
    }
}
