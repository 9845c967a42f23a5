mod app;
pub use app::*;

pub mod input;
pub mod palette;

mod window_resizing;
