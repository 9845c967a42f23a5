use strum::{AsRefStr, Display, EnumIter};

use crate::background::detect_background;
use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::thresholds::RecolorThresholds;
use crate::tint::is_backdrop;

/// Colors the gecko sprite is drawn with.
pub mod reference {
    use crate::color::Rgb;

    pub const SKIN: Rgb = Rgb::new(232, 197, 71);
    pub const DOTS: Rgb = Rgb::new(139, 105, 20);
    pub const BELLY: Rgb = Rgb::new(245, 230, 184);
    pub const EYES: Rgb = Rgb::new(45, 45, 45);
}

// How far green may exceed red and blue in an eye pixel
const GREEN_MARGIN: i16 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Region {
    Skin,
    Dots,
    Belly,
    Eyes,
}

/// A named part of a sprite: the color it was drawn with and the color it
/// should be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRegion {
    pub reference: Rgb,
    pub replacement: Rgb,
}

impl ColorRegion {
    pub const fn unchanged(reference: Rgb) -> Self {
        Self {
            reference,
            replacement: reference,
        }
    }

    /// Scales the replacement by how much brighter or darker each channel of
    /// `pixel` is than the reference.
    pub fn repaint(&self, pixel: Rgb) -> Rgb {
        let scale = |value: u8, reference: u8, replacement: u8| {
            let ratio = if reference == 0 {
                1.0
            } else {
                f32::from(value) / f32::from(reference)
            };
            (f32::from(replacement) * ratio).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            scale(pixel.r, self.reference.r, self.replacement.r),
            scale(pixel.g, self.reference.g, self.replacement.g),
            scale(pixel.b, self.reference.b, self.replacement.b),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeckoPalette {
    pub skin: ColorRegion,
    pub dots: ColorRegion,
    pub belly: ColorRegion,
    pub eyes: ColorRegion,
}

impl Default for GeckoPalette {
    fn default() -> Self {
        Self {
            skin: ColorRegion::unchanged(reference::SKIN),
            dots: ColorRegion::unchanged(reference::DOTS),
            belly: ColorRegion::unchanged(reference::BELLY),
            eyes: ColorRegion::unchanged(reference::EYES),
        }
    }
}

impl GeckoPalette {
    pub fn with_replacements(skin: Rgb, dots: Rgb, belly: Rgb, eyes: Rgb) -> Self {
        let mut palette = Self::default();
        palette.skin.replacement = skin;
        palette.dots.replacement = dots;
        palette.belly.replacement = belly;
        palette.eyes.replacement = eyes;
        palette
    }

    pub const fn region(&self, region: Region) -> &ColorRegion {
        match region {
            Region::Skin => &self.skin,
            Region::Dots => &self.dots,
            Region::Belly => &self.belly,
            Region::Eyes => &self.eyes,
        }
    }

    pub const fn region_mut(&mut self, region: Region) -> &mut ColorRegion {
        match region {
            Region::Skin => &mut self.skin,
            Region::Dots => &mut self.dots,
            Region::Belly => &mut self.belly,
            Region::Eyes => &mut self.eyes,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        [self.skin, self.dots, self.belly, self.eyes]
            .iter()
            .all(|region| region.reference == region.replacement)
    }

    /// Which region `pixel` belongs to, first matching rule wins:
    /// dark non-green pixels near the eye color, then belly, then dots,
    /// then anything within the wide skin radius.
    pub fn classify(&self, pixel: Rgb, thresholds: &RecolorThresholds) -> Option<Region> {
        let to_skin = pixel.distance(self.skin.reference);
        let to_dots = pixel.distance(self.dots.reference);
        let to_belly = pixel.distance(self.belly.reference);
        let to_eyes = pixel.distance(self.eyes.reference);

        let greenish = i16::from(pixel.g) - i16::from(pixel.r.max(pixel.b)) > GREEN_MARGIN;
        if pixel.max_channel() <= thresholds.dark_max && !greenish && to_eyes < thresholds.eyes {
            return Some(Region::Eyes);
        }
        if to_belly < thresholds.belly
            && to_belly < to_dots
            && to_belly < thresholds.belly_vs_skin * to_skin
        {
            return Some(Region::Belly);
        }
        if to_dots < thresholds.dots && to_dots < thresholds.dots_vs_skin * to_skin {
            return Some(Region::Dots);
        }
        (to_skin < thresholds.skin).then_some(Region::Skin)
    }
}

/// Repaints each visible, non-background pixel with its region's
/// replacement. Pixels that fit no region keep their color.
pub fn recolor_regions(
    original: &PixelBuffer,
    palette: &GeckoPalette,
    thresholds: &RecolorThresholds,
) -> PixelBuffer {
    let background = detect_background(original, thresholds.alpha_min);
    original.map_pixels(|color, alpha| {
        if is_backdrop(color, alpha, background, thresholds) {
            return None;
        }
        let region = palette.classify(color, thresholds)?;
        Some(palette.region(region).repaint(color))
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn reference_colors_classify_as_themselves() {
        let palette = GeckoPalette::default();
        let thresholds = RecolorThresholds::default();
        for region in Region::iter() {
            let color = palette.region(region).reference;
            assert_eq!(palette.classify(color, &thresholds), Some(region), "{region}");
        }
    }

    #[test]
    fn reference_pixel_takes_the_replacement_exactly() {
        let palette = GeckoPalette::with_replacements(
            Rgb::new(255, 0, 0),
            reference::DOTS,
            reference::BELLY,
            reference::EYES,
        );
        assert_eq!(palette.skin.repaint(reference::SKIN), Rgb::new(255, 0, 0));
    }

    #[test]
    fn repaint_keeps_relative_brightness() {
        let region = ColorRegion {
            reference: Rgb::new(200, 100, 50),
            replacement: Rgb::new(100, 100, 100),
        };
        assert_eq!(region.repaint(Rgb::new(100, 50, 25)), Rgb::new(50, 50, 50));
        // Brighter than the reference clamps
        assert_eq!(region.repaint(Rgb::new(250, 255, 255)), Rgb::new(125, 255, 255));
    }

    #[test]
    fn zero_reference_channel_uses_the_replacement() {
        let region = ColorRegion {
            reference: Rgb::new(0, 10, 10),
            replacement: Rgb::new(77, 20, 20),
        };
        assert_eq!(region.repaint(Rgb::new(30, 10, 5)), Rgb::new(77, 20, 10));
    }

    #[test]
    fn green_darks_are_not_eyes() {
        let palette = GeckoPalette::default();
        let thresholds = RecolorThresholds::default();
        assert_eq!(palette.classify(Rgb::new(30, 75, 30), &thresholds), None);
        assert_eq!(palette.classify(Rgb::new(40, 40, 45), &thresholds), Some(Region::Eyes));
    }

    #[test]
    fn far_colors_are_left_alone() {
        let palette = GeckoPalette::default();
        assert_eq!(palette.classify(Rgb::new(0, 0, 255), &RecolorThresholds::default()), None);
    }
}
