use crate::error::{Result, StatementError};
use crate::pdf::PageSize;

/// Raster multiplier over PDF points (2x is roughly 150dpi).
pub const DEFAULT_SCALE: f32 = 2.0;

/// Page margin in points, before scaling.
const MARGIN_PT: f32 = 28.0;

/// Logical page size plus the raster scale used to draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    page: PageSize,
    scale: f32,
}

impl PageGeometry {
    /// Fails fast on zero, negative or non-finite values.
    pub fn new(page: PageSize, scale: f32) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(page.width) || !valid(page.height) {
            return Err(StatementError::Configuration(format!(
                "page size must be positive, got {}x{}",
                page.width, page.height
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(StatementError::Configuration(format!(
                "raster scale must be positive, got {scale}"
            )));
        }
        let geometry = Self { page, scale };
        if geometry.usable_height() <= 0.0 || geometry.width_px() as f32 <= 2.0 * geometry.margin()
        {
            return Err(StatementError::Configuration(format!(
                "page {}x{} is smaller than its margins",
                page.width, page.height
            )));
        }
        Ok(geometry)
    }

    pub fn a4() -> Self {
        Self {
            page: PageSize::A4,
            scale: DEFAULT_SCALE,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn width_px(&self) -> u32 {
        (self.page.width * f64::from(self.scale)).round() as u32
    }

    pub fn height_px(&self) -> u32 {
        (self.page.height * f64::from(self.scale)).round() as u32
    }

    /// Converts a length in points to device pixels.
    pub fn px(&self, pt: f32) -> f32 {
        pt * self.scale
    }

    pub fn margin(&self) -> f32 {
        self.px(MARGIN_PT)
    }

    /// Lowest y content may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.height_px() as f32 - self.margin()
    }

    pub fn usable_height(&self) -> f32 {
        self.height_px() as f32 - 2.0 * self.margin()
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_at_double_scale() {
        let geometry = PageGeometry::a4();
        assert_eq!(geometry.width_px(), 1191);
        assert_eq!(geometry.height_px(), 1684);
        assert_eq!(geometry.margin(), 56.0);
        assert_eq!(geometry.bottom_limit(), 1628.0);
    }

    #[test]
    fn rejects_bad_sizes() {
        let bad = [
            PageSize { width: 0.0, height: 800.0 },
            PageSize { width: 600.0, height: -1.0 },
            PageSize { width: f64::NAN, height: 800.0 },
            PageSize { width: 50.0, height: 50.0 },
        ];
        for page in bad {
            assert!(matches!(
                PageGeometry::new(page, 2.0),
                Err(StatementError::Configuration(_))
            ));
        }
        assert!(PageGeometry::new(PageSize::A4, 0.0).is_err());
    }
}
