use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::surface::RasterSurface;
use crate::error::{Result, StatementError};
use crate::layout::Page;
use crate::pdf::PageImage;

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encode one finished page as a baseline RGB JPEG.
pub fn encode_jpeg(
    page: &Page<RasterSurface<'_>>,
    quality: u8,
    index: usize,
) -> Result<PageImage> {
    let pixmap = page.surface.pixmap();
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .write_image(&rgb, pixmap.width(), pixmap.height(), ExtendedColorType::Rgb8)
        .map_err(|e| StatementError::Encoding {
            index,
            reason: e.to_string(),
        })?;

    Ok(PageImage {
        bytes,
        width_px: page.width_px,
        height_px: page.height_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageGeometry, Rect, Rgb, Surface, SurfaceFactory};
    use crate::pdf::PageSize;
    use crate::raster::RasterFactory;

    #[test]
    fn encodes_a_jpeg_with_page_dimensions() {
        let size = PageSize {
            width: 200.0,
            height: 100.0,
        };
        let geometry = PageGeometry::new(size, 1.0).unwrap();
        let factory = RasterFactory::new(geometry, None).unwrap();
        let mut surface = factory.blank(geometry.width_px(), geometry.height_px());
        surface.fill_rect(Rect::new(10.0, 10.0, 50.0, 20.0), Rgb::INK);
        let page = Page {
            surface,
            width_px: geometry.width_px(),
            height_px: geometry.height_px(),
        };

        let image = encode_jpeg(&page, DEFAULT_JPEG_QUALITY, 0).unwrap();
        assert!(image.bytes.starts_with(&[0xFF, 0xD8]));
        assert!(image.bytes.ends_with(&[0xFF, 0xD9]));
        assert_eq!((image.width_px, image.height_px), (200, 100));

        let decoded = image::load_from_memory(&image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }
}
