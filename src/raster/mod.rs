mod encode;
mod font;
mod surface;

pub use encode::{encode_jpeg, DEFAULT_JPEG_QUALITY};
pub use font::FontData;
pub use surface::{RasterFactory, RasterSurface};
