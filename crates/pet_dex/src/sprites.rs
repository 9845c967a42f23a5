//! Built-in pixel-art sprites, drawn in code at their native size.
//!
//! The gecko is painted with exactly the reference swatches the region
//! recolor looks for, and the beetle body in shades of the default beetle
//! tone, so both recolor cleanly.

use bevy::prelude::*;
use image::{Rgba, RgbaImage};
use sprite_recolor::{DEFAULT_BEETLE_BODY, PixelBuffer, Rgb, reference};

use crate::model::Species;

pub const SPRITE_WIDTH: u32 = 48;
pub const SPRITE_HEIGHT: u32 = 36;

const BACKDROP: Rgb = Rgb::new(15, 56, 15);
const OUTLINE: Rgb = Rgb::new(0, 0, 0);
const WHITE: Rgb = Rgb::new(255, 255, 255);

struct Canvas(RgbaImage);

impl Canvas {
    fn new(fill: Rgb) -> Self {
        let [r, g, b] = fill.to_array();
        Self(RgbaImage::from_pixel(SPRITE_WIDTH, SPRITE_HEIGHT, Rgba([r, g, b, 255])))
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < self.0.width() && y < self.0.height() {
            let [r, g, b] = color.to_array();
            self.0.put_pixel(x, y, Rgba([r, g, b, 255]));
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        let [r, g, b, _] = self.0.get_pixel_checked(x, y)?.0;
        Some(Rgb::new(r, g, b))
    }

    fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.put(x, y, color);
            }
        }
    }

    fn line(&mut self, (x0, y0): (i32, i32), (x1, y1): (i32, i32), color: Rgb) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.put(x, y, color);
            if (x, y) == (x1, y1) {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += sx;
            }
            if doubled <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Even-odd fill sampled at pixel centers, edges included.
    fn polygon(&mut self, points: &[(i32, i32)], color: Rgb) {
        let (Some(min_y), Some(max_y)) = (
            points.iter().map(|p| p.1).min(),
            points.iter().map(|p| p.1).max(),
        ) else {
            return;
        };
        for y in min_y..=max_y {
            let mut crossings: Vec<f32> = Vec::new();
            for (index, &(ax, ay)) in points.iter().enumerate() {
                let (bx, by) = points[(index + 1) % points.len()];
                if (ay <= y) != (by <= y) {
                    let t = (y - ay) as f32 / (by - ay) as f32;
                    crossings.push(ax as f32 + t * (bx - ax) as f32);
                }
            }
            crossings.sort_by(f32::total_cmp);
            for span in crossings.chunks_exact(2) {
                for x in span[0].ceil() as i32..=span[1].floor() as i32 {
                    self.put(x, y, color);
                }
            }
        }
        for (index, &from) in points.iter().enumerate() {
            self.line(from, points[(index + 1) % points.len()], color);
        }
    }

    fn ellipse(&mut self, (cx, cy): (f32, f32), (rx, ry): (f32, f32), color: Rgb) {
        for y in (cy - ry).floor() as i32..=(cy + ry).ceil() as i32 {
            for x in (cx - rx).floor() as i32..=(cx + rx).ceil() as i32 {
                let (nx, ny) = ((x as f32 - cx) / rx, (y as f32 - cy) / ry);
                if nx * nx + ny * ny <= 1.0 {
                    self.put(x, y, color);
                }
            }
        }
    }

    fn finish(self) -> PixelBuffer {
        PixelBuffer::from(self.0)
    }
}

pub fn gecko() -> PixelBuffer {
    let (skin, dots, belly, eye) =
        (reference::SKIN, reference::DOTS, reference::BELLY, reference::EYES);
    let mut canvas = Canvas::new(BACKDROP);

    canvas.polygon(
        &[
            (8, 9), (6, 9), (4, 10), (3, 11), (2, 13), (2, 15), (2, 17),
            (3, 19), (4, 20), (6, 21), (8, 22),
            (10, 23), (12, 24), (14, 25), (18, 25), (20, 24), (22, 23),
            (24, 22), (26, 21), (28, 20), (30, 19), (32, 18),
            (34, 16), (35, 14), (36, 12), (37, 10), (37, 8), (36, 7),
            (35, 7), (34, 8), (33, 9), (31, 10), (29, 11),
            (27, 12), (25, 13), (23, 13), (20, 13), (17, 12),
            (14, 11), (12, 10), (10, 9),
        ],
        OUTLINE,
    );
    canvas.polygon(
        &[
            (8, 10), (6, 10), (5, 11), (4, 12), (3, 13), (3, 15), (3, 17),
            (4, 19), (5, 20), (7, 21),
            (9, 22), (11, 23), (13, 24), (17, 24), (19, 23), (21, 22),
            (23, 21), (25, 20), (27, 19), (29, 18), (31, 17),
            (33, 15), (34, 13), (35, 11), (36, 9), (36, 8),
            (35, 8), (34, 9), (33, 10), (31, 11),
            (29, 12), (27, 13), (24, 14), (21, 14), (18, 13),
            (15, 12), (13, 11), (11, 10),
        ],
        skin,
    );
    canvas.polygon(
        &[
            (4, 17), (3, 16), (3, 15),
            (4, 17), (5, 18), (6, 19), (7, 20),
            (9, 21), (11, 22), (14, 23), (17, 23),
            (18, 22), (16, 22), (13, 21), (11, 20), (9, 19),
            (7, 18), (5, 17),
        ],
        belly,
    );

    for left in [7, 19] {
        let top = if left == 7 { 22 } else { 24 };
        canvas.polygon(&[(left, top), (left + 3, top), (left + 3, 29), (left, 29)], OUTLINE);
        canvas.rect(left + 1, top + 1, left + 2, 28, skin);
        canvas.rect(left + 1, 27, left + 2, 28, belly);
    }

    canvas.rect(4, 13, 7, 16, eye);
    canvas.put(4, 13, WHITE);
    canvas.put(5, 13, WHITE);
    canvas.put(3, 18, OUTLINE);

    let spots = [
        (8, 12), (10, 11), (9, 14),
        (14, 13), (17, 14), (20, 13), (12, 14),
        (16, 12), (19, 12), (13, 16), (16, 15),
        (19, 16), (10, 15), (15, 14), (21, 15),
        (25, 15), (27, 14), (24, 16),
        (29, 13), (31, 12), (33, 11), (35, 10),
        (30, 15), (32, 14), (34, 12),
    ];
    for (x, y) in spots {
        if canvas.get(x, y) == Some(skin) {
            canvas.put(x, y, dots);
        }
    }
    canvas.finish()
}

fn shade(color: Rgb, factor: f32) -> Rgb {
    let scale = |channel: u8| (f32::from(channel) * factor).round().clamp(0.0, 255.0) as u8;
    Rgb::new(scale(color.r), scale(color.g), scale(color.b))
}

pub fn beetle() -> PixelBuffer {
    let body = DEFAULT_BEETLE_BODY;
    let (dark, light) = (shade(body, 0.6), shade(body, 1.5));
    let mut canvas = Canvas::new(BACKDROP);

    // Legs under the shell
    for x in [18, 26, 34] {
        canvas.line((x, 24), (x - 3, 31), OUTLINE);
        canvas.line((x - 3, 31), (x - 5, 31), OUTLINE);
    }

    canvas.ellipse((28.0, 18.0), (14.5, 9.5), OUTLINE);
    canvas.ellipse((28.0, 18.0), (13.5, 8.5), body);
    canvas.ellipse((30.0, 21.0), (11.0, 5.0), dark);
    canvas.ellipse((28.0, 17.0), (11.5, 6.0), body);
    canvas.ellipse((24.0, 14.0), (5.0, 2.0), light);
    canvas.line((28, 10), (28, 26), dark);

    // Head and horn
    canvas.ellipse((12.0, 18.0), (4.5, 4.5), OUTLINE);
    canvas.ellipse((12.0, 18.0), (3.5, 3.5), dark);
    canvas.polygon(&[(10, 16), (7, 12), (4, 6), (3, 4), (5, 5), (9, 11), (13, 15)], OUTLINE);
    canvas.polygon(&[(10, 15), (7, 11), (5, 6), (8, 10), (12, 15)], body);
    canvas.put(10, 19, WHITE);
    canvas.finish()
}

pub fn dog() -> PixelBuffer {
    let fur = Rgb::new(196, 140, 72);
    let (ear, muzzle) = (shade(fur, 0.6), Rgb::new(240, 220, 180));
    let mut canvas = Canvas::new(BACKDROP);

    canvas.ellipse((24.0, 19.0), (13.0, 12.0), OUTLINE);
    canvas.ellipse((24.0, 19.0), (12.0, 11.0), fur);
    for (cx, sign) in [(12.0, -1.0), (36.0, 1.0)] {
        canvas.ellipse((cx, 17.0), (4.0, 8.0), OUTLINE);
        canvas.ellipse((cx + sign * 0.5, 17.0), (3.0, 7.0), ear);
    }
    canvas.ellipse((24.0, 25.0), (6.0, 4.5), muzzle);
    canvas.rect(22, 21, 26, 23, OUTLINE);
    canvas.line((24, 24), (24, 26), OUTLINE);
    canvas.line((21, 27), (27, 27), OUTLINE);
    for x in [18, 29] {
        canvas.rect(x, 15, x + 1, 17, OUTLINE);
        canvas.put(x, 15, WHITE);
    }
    canvas.finish()
}

pub fn for_species(species: &Species) -> PixelBuffer {
    match species {
        Species::RhinoBeetle => beetle(),
        Species::Dog => dog(),
        Species::LeopardGecko | Species::Other(_) => gecko(),
    }
}

/// Image handles for the built-in sprites, added to the image assets once.
#[derive(Resource, Debug, Clone)]
pub struct SpriteHandles {
    pub gecko: Handle<Image>,
    pub beetle: Handle<Image>,
    pub dog: Handle<Image>,
}

impl SpriteHandles {
    pub fn for_species(&self, species: &Species) -> Handle<Image> {
        match species {
            Species::RhinoBeetle => self.beetle.clone(),
            Species::Dog => self.dog.clone(),
            Species::LeopardGecko | Species::Other(_) => self.gecko.clone(),
        }
    }
}

impl FromWorld for SpriteHandles {
    fn from_world(world: &mut World) -> Self {
        let mut images = world.resource_mut::<Assets<Image>>();
        Self {
            gecko: images.add(gecko().to_image()),
            beetle: images.add(beetle().to_image()),
            dog: images.add(dog().to_image()),
        }
    }
}

#[cfg(test)]
mod tests {
    use sprite_recolor::{
        GeckoPalette, Recipe, RecolorThresholds, detect_background, recolor,
    };

    use super::*;

    fn count(buffer: &PixelBuffer, color: Rgb) -> usize {
        buffer
            .as_bytes()
            .chunks_exact(4)
            .filter(|px| px[..3] == color.to_array())
            .count()
    }

    #[test]
    fn gecko_uses_every_reference_swatch() {
        let sprite = gecko();
        assert_eq!((sprite.width(), sprite.height()), (SPRITE_WIDTH, SPRITE_HEIGHT));
        for swatch in [reference::SKIN, reference::DOTS, reference::BELLY, reference::EYES] {
            assert!(count(&sprite, swatch) > 0, "{swatch} missing");
        }
        assert_eq!(sprite.pixel(4, 13), Some([255, 255, 255, 255]));
    }

    #[test]
    fn corners_are_backdrop() {
        let thresholds = RecolorThresholds::default();
        for sprite in [gecko(), beetle(), dog()] {
            assert_eq!(detect_background(&sprite, thresholds.alpha_min), BACKDROP);
        }
    }

    #[test]
    fn repainting_the_skin_moves_every_skin_pixel() {
        let sprite = gecko();
        let skin = count(&sprite, reference::SKIN);
        let red = Rgb::new(255, 0, 0);
        let palette = GeckoPalette::with_replacements(
            red,
            reference::DOTS,
            reference::BELLY,
            reference::EYES,
        );
        let painted = recolor(&sprite, &Recipe::Regions(palette), &RecolorThresholds::default());
        assert_eq!(count(&painted, reference::SKIN), 0);
        assert!(count(&painted, red) >= skin);
    }

    #[test]
    fn beetle_body_is_the_default_tone() {
        assert!(count(&beetle(), DEFAULT_BEETLE_BODY) > 50);
    }
}
