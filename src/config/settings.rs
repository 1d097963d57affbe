use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{PageGeometry, DEFAULT_BRAND_SUBTITLE, DEFAULT_BRAND_TITLE, DEFAULT_SCALE};
use crate::pdf::PageSize;
use crate::raster::DEFAULT_JPEG_QUALITY;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub brand: BrandSettings,
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct BrandSettings {
    pub title: String,
    pub subtitle: String,
}

impl Default for BrandSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_BRAND_TITLE.to_string(),
            subtitle: DEFAULT_BRAND_SUBTITLE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PageSettings {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Raster pixels per point.
    pub scale: f32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            width: PageSize::A4.width,
            height: PageSize::A4.height,
            scale: DEFAULT_SCALE,
        }
    }
}

impl PageSettings {
    pub fn geometry(&self) -> Result<PageGeometry> {
        PageGeometry::new(
            PageSize {
                width: self.width,
                height: self.height,
            },
            self.scale,
        )
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    pub jpeg_quality: u8,
    /// Font file to draw with; system fonts are searched when unset.
    pub font: Option<String>,
    /// Currency code used when neither the client nor the invoice has one.
    pub default_currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            font: None,
            default_currency: default_currency(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PdfSettings {
    pub output_dir: String,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
        }
    }
}
