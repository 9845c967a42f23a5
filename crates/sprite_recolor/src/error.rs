use bevy::render::render_resource::TextureFormat;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecolorError {
    #[error("Pixel data is {actual} bytes, a {width}x{height} RGBA buffer needs {expected}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported texture format: {0:?}")]
    UnsupportedFormat(TextureFormat),
}
