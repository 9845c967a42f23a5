use std::sync::Arc;

use image::RgbaImage;

use crate::color::Rgb;
use crate::error::RecolorError;

/// Straight-alpha RGBA8 pixels, row major. Cloning shares the bytes, so a
/// cached original can be handed around without copying and is never
/// written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Result<Self, RecolorError> {
        let data = data.into();
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RecolorError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(index..index + 4)?.try_into().ok()
    }

    /// Copies the pixels, hands each one to `paint` and wraps the result.
    /// `paint` returns the new color or `None` to keep the pixel.
    pub fn map_pixels(&self, mut paint: impl FnMut(Rgb, u8) -> Option<Rgb>) -> Self {
        let mut data = self.data.to_vec();
        for pixel in data.chunks_exact_mut(4) {
            let color = Rgb::new(pixel[0], pixel[1], pixel[2]);
            if let Some(new) = paint(color, pixel[3]) {
                pixel[..3].copy_from_slice(&new.to_array());
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data: data.into(),
        }
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.into_raw().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_data() {
        assert_eq!(
            PixelBuffer::new(2, 2, vec![0; 15]),
            Err(RecolorError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn pixel_lookup() {
        let buffer = PixelBuffer::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(buffer.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(buffer.pixel(2, 0), None);
        assert_eq!(buffer.pixel(0, 1), None);
    }

    #[test]
    fn map_leaves_source_and_alpha_alone() {
        let buffer = PixelBuffer::new(1, 1, vec![10, 20, 30, 40]).unwrap();
        let painted = buffer.map_pixels(|_, _| Some(Rgb::new(1, 2, 3)));
        assert_eq!(painted.as_bytes(), &[1, 2, 3, 40]);
        assert_eq!(buffer.as_bytes(), &[10, 20, 30, 40]);
    }

    #[test]
    fn converts_from_image_crate() {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 255]));
        let buffer = PixelBuffer::from(image);
        assert_eq!((buffer.width(), buffer.height()), (3, 2));
        assert_eq!(buffer.pixel(2, 1), Some([9, 8, 7, 255]));
        assert_eq!(buffer.to_rgba_image().map(|image| image.dimensions()), Some((3, 2)));
    }
}
