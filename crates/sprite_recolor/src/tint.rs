use crate::background::detect_background;
use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::hsl::Hsl;
use crate::thresholds::RecolorThresholds;

/// Repaints every visible, non-background pixel with the hue and saturation
/// of `target`, keeping the pixel's own lightness so shading survives.
pub fn tint(original: &PixelBuffer, target: Rgb, thresholds: &RecolorThresholds) -> PixelBuffer {
    let background = detect_background(original, thresholds.alpha_min);
    let Hsl { h, s, .. } = Hsl::from_rgb(target);

    original.map_pixels(|color, alpha| {
        if is_backdrop(color, alpha, background, thresholds) {
            return None;
        }
        let l = Hsl::from_rgb(color).l;
        Some(Hsl { h, s, l }.to_rgb())
    })
}

/// Transparent enough, or close enough to the background, to leave alone.
pub(crate) fn is_backdrop(
    color: Rgb,
    alpha: u8,
    background: Rgb,
    thresholds: &RecolorThresholds,
) -> bool {
    alpha < thresholds.alpha_min || color.distance(background) < thresholds.background
}
