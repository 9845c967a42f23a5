use crate::buffer::PixelBuffer;
use crate::color::Rgb;

/// Used when no corner pixel is visible.
pub const FALLBACK_BACKGROUND: Rgb = Rgb::new(200, 200, 200);

/// Guesses the backdrop color of a sprite from its four corners.
///
/// Only corners with alpha above `alpha_min` count; their RGB is averaged
/// and rounded. A sprite whose corners are all transparent gets
/// [`FALLBACK_BACKGROUND`].
pub fn detect_background(buffer: &PixelBuffer, alpha_min: u8) -> Rgb {
    let right = buffer.width().saturating_sub(1);
    let bottom = buffer.height().saturating_sub(1);
    let corners = [(0, 0), (right, 0), (0, bottom), (right, bottom)];

    let mut sum = [0u32; 3];
    let mut count = 0u32;
    for [r, g, b, a] in corners.iter().filter_map(|&(x, y)| buffer.pixel(x, y)) {
        if a > alpha_min {
            sum[0] += u32::from(r);
            sum[1] += u32::from(g);
            sum[2] += u32::from(b);
            count += 1;
        }
    }
    if count == 0 {
        return FALLBACK_BACKGROUND;
    }

    let average = |total: u32| {
        // Round half up
        u8::try_from((total * 2 + count) / (count * 2)).unwrap_or(u8::MAX)
    };
    Rgb::new(average(sum[0]), average(sum[1]), average(sum[2]))
}
