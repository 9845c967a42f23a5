use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sprite_recolor::{
    GeckoPalette, Hsl, PixelBuffer, Recipe, RecolorThresholds, Rgb, detect_background, recolor,
    reference,
};

const GRAY: [u8; 4] = [200, 200, 200, 255];

/// A `size` x `size` sprite with gray corners and `body` everywhere else.
fn sprite_on_gray(size: u32, body: &[[u8; 4]]) -> PixelBuffer {
    let mut data = Vec::new();
    let mut body = body.iter().cycle();
    for y in 0..size {
        for x in 0..size {
            let corner = (x == 0 || x == size - 1) && (y == 0 || y == size - 1);
            let pixel = if corner {
                GRAY
            } else {
                body.next().copied().unwrap_or(GRAY)
            };
            data.extend_from_slice(&pixel);
        }
    }
    PixelBuffer::new(size, size, data).unwrap()
}

fn red_skin() -> Recipe {
    Recipe::Regions(GeckoPalette::with_replacements(
        Rgb::parse_hex("#ff0000").unwrap(),
        reference::DOTS,
        reference::BELLY,
        reference::EYES,
    ))
}

#[test]
fn skin_reference_pixel_becomes_the_new_skin() {
    let skin = [232, 197, 71, 255];
    let sprite = sprite_on_gray(3, &[skin]);
    let painted = recolor(&sprite, &red_skin(), &RecolorThresholds::default());
    assert_eq!(painted.pixel(1, 1), Some([255, 0, 0, 255]));
}

#[test]
fn pixels_near_a_gray_backdrop_survive() {
    // Within 45 of (200,200,200), and close enough to the belly that it
    // would be repainted otherwise
    let near_gray = [225, 215, 180, 255];
    let far = [232, 197, 71, 255];
    let sprite = sprite_on_gray(4, &[near_gray, far]);
    let thresholds = RecolorThresholds::default();

    assert_eq!(detect_background(&sprite, thresholds.alpha_min), Rgb::new(200, 200, 200));
    let recipe = Recipe::Regions(GeckoPalette::with_replacements(
        Rgb::new(0, 0, 255),
        Rgb::new(0, 255, 0),
        Rgb::new(255, 0, 255),
        Rgb::new(255, 255, 255),
    ));
    let painted = recolor(&sprite, &recipe, &thresholds);

    for y in 0..4 {
        for x in 0..4 {
            let before = sprite.pixel(x, y).unwrap();
            let after = painted.pixel(x, y).unwrap();
            let color = Rgb::new(before[0], before[1], before[2]);
            if color.distance(Rgb::new(200, 200, 200)) < thresholds.background {
                assert_eq!(after, before, "pixel {x},{y} changed");
            } else {
                assert_ne!(after, before, "pixel {x},{y} untouched");
            }
        }
    }
}

#[test]
fn default_palette_is_the_original() {
    let sprite = sprite_on_gray(3, &[[232, 197, 71, 255]]);
    let painted = recolor(
        &sprite,
        &Recipe::Regions(GeckoPalette::default()),
        &RecolorThresholds::default(),
    );
    assert_eq!(painted, sprite);
}

fn pixels() -> impl Strategy<Value = Vec<[u8; 4]>> {
    prop::collection::vec(any::<[u8; 4]>(), 1..40)
}

fn rgb() -> impl Strategy<Value = Rgb> {
    any::<[u8; 3]>().prop_map(Rgb::from)
}

proptest! {
    #[test]
    fn recoloring_is_idempotent(body in pixels(), skin in rgb(), dots in rgb(), target in rgb()) {
        let sprite = sprite_on_gray(7, &body);
        let thresholds = RecolorThresholds::default();
        let regions = Recipe::Regions(GeckoPalette::with_replacements(
            skin,
            dots,
            reference::BELLY,
            reference::EYES,
        ));

        for recipe in [regions, Recipe::Tint(target)] {
            let first = recolor(&sprite, &recipe, &thresholds);
            let second = recolor(&sprite, &recipe, &thresholds);
            prop_assert_eq!(first.as_bytes(), second.as_bytes());
        }
        // The source is shared, never written
        prop_assert_eq!(sprite.clone(), sprite_on_gray(7, &body));
    }

    #[test]
    fn tint_keeps_lightness(body in pixels(), target in rgb()) {
        let sprite = sprite_on_gray(7, &body);
        let painted = recolor(&sprite, &Recipe::Tint(target), &RecolorThresholds::default());

        let pixels = sprite.as_bytes().chunks_exact(4);
        for (before, after) in pixels.zip(painted.as_bytes().chunks_exact(4)) {
            let l_before = Hsl::from_rgb(Rgb::new(before[0], before[1], before[2])).l;
            let l_after = Hsl::from_rgb(Rgb::new(after[0], after[1], after[2])).l;
            prop_assert!((l_before - l_after).abs() <= 1.0 / 255.0 + 1e-9);
            prop_assert_eq!(before[3], after[3]);
        }
    }
}
