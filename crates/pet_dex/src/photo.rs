use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PhotoError;
use crate::model::Species;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Size caps for custom photos stored inside the roster blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoLimits {
    pub gecko_max: u32,
    pub dog_max: u32,
    /// Longest data URL worth storing before quality is lowered.
    pub max_data_url: usize,
    pub start_quality: u8,
    pub min_quality: u8,
}

impl Default for PhotoLimits {
    fn default() -> Self {
        Self {
            gecko_max: 200,
            dog_max: 300,
            max_data_url: 150_000,
            start_quality: 70,
            min_quality: 30,
        }
    }
}

impl PhotoLimits {
    pub const fn max_side(&self, species: &Species) -> u32 {
        match species {
            Species::Dog => self.dog_max,
            _ => self.gecko_max,
        }
    }
}

/// Size that fits inside `max_side` on both axes, keeping the aspect ratio.
/// Images already small enough keep their size.
pub fn fitted_size(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    if width <= max_side && height <= max_side {
        return (width, height);
    }
    let scale = f64::from(max_side) / f64::from(width.max(height));
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (fit(width), fit(height))
}

/// Shrinks an uploaded photo and packs it as a JPEG data URL, lowering the
/// quality in steps of ten while the URL is still too long.
pub fn downscale_to_data_url(
    bytes: &[u8],
    species: &Species,
    limits: &PhotoLimits,
) -> Result<String, PhotoError> {
    let source = image::load_from_memory(bytes)?;
    let (width, height) = fitted_size(source.width(), source.height(), limits.max_side(species));
    let rgb = if (width, height) == (source.width(), source.height()) {
        source.to_rgb8()
    } else {
        imageops::resize(&source.to_rgb8(), width, height, FilterType::Triangle)
    };

    let mut quality = limits.start_quality.clamp(1, 100);
    loop {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&rgb)?;
        let url = format!("{DATA_URL_PREFIX}{}", BASE64.encode(&jpeg));
        if url.len() <= limits.max_data_url || quality <= limits.min_quality {
            debug!("photo {width}x{height} at quality {quality}: {} bytes", url.len());
            return Ok(url);
        }
        quality = quality.saturating_sub(10).max(limits.min_quality);
    }
}

/// Decodes a stored data URL for display.
pub fn decode_data_url(url: &str) -> Result<RgbaImage, PhotoError> {
    let payload = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(PhotoError::NotADataUrl)?;
    let bytes = BASE64.decode(payload)?;
    Ok(image::load_from_memory(&bytes).map(DynamicImage::into_rgba8)?)
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image =
            RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn fitting_keeps_aspect_ratio() {
        assert_eq!(fitted_size(800, 400, 200), (200, 100));
        assert_eq!(fitted_size(300, 1000, 300), (90, 300));
        assert_eq!(fitted_size(120, 80, 200), (120, 80));
        assert_eq!(fitted_size(5000, 1, 200), (200, 1));
    }

    #[test]
    fn dogs_get_larger_photos() {
        let limits = PhotoLimits::default();
        assert_eq!(limits.max_side(&Species::Dog), 300);
        assert_eq!(limits.max_side(&Species::RhinoBeetle), 200);
    }

    #[test]
    fn downscaled_photo_decodes_at_the_capped_size() {
        let limits = PhotoLimits::default();
        let url = downscale_to_data_url(&png(640, 480), &Species::LeopardGecko, &limits).unwrap();
        assert!(url.starts_with(DATA_URL_PREFIX));
        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded.dimensions(), (200, 150));
    }

    #[test]
    fn quality_bottoms_out_instead_of_failing() {
        let limits = PhotoLimits {
            max_data_url: 10,
            ..PhotoLimits::default()
        };
        let url = downscale_to_data_url(&png(64, 64), &Species::Dog, &limits).unwrap();
        assert!(url.len() > limits.max_data_url);
    }

    #[test]
    fn rejects_garbage() {
        let limits = PhotoLimits::default();
        assert!(downscale_to_data_url(b"not an image", &Species::Dog, &limits).is_err());
        assert!(matches!(decode_data_url("hello"), Err(PhotoError::NotADataUrl)));
    }
}
