/// Opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const INK: Rgb = Rgb(0x11, 0x11, 0x11);
    pub const MUTED: Rgb = Rgb(0x5f, 0x6b, 0x7a);
    pub const BORDER: Rgb = Rgb(0xd7, 0xdd, 0xe5);
    pub const GRID: Rgb = Rgb(0xe3, 0xe8, 0xef);
    pub const SEPARATOR: Rgb = Rgb(0xee, 0xf2, 0xf6);
    pub const HEADER_FILL: Rgb = Rgb(0xf2, 0xf5, 0xf9);
    pub const TOTAL_FILL: Rgb = Rgb(0xea, 0xff, 0xea);
}

/// Axis-aligned rectangle in device pixels, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Which edge of the text sits on the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub bold: bool,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(size_px: f32, color: Rgb) -> Self {
        Self {
            size_px,
            bold: false,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// 2D drawing capability the layout engine paints onto.
///
/// Text is laid out right to left; `y` is the top of the text line.
pub trait Surface {
    fn width_px(&self) -> u32;

    fn height_px(&self) -> u32;

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32);

    fn stroke_round_rect(&mut self, rect: Rect, radius: f32, color: Rgb, line_width: f32);

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, line_width: f32);

    fn fill_text(&mut self, text: &str, x: f32, y: f32, anchor: Anchor, style: TextStyle);

    /// Advance width of `text` in pixels.
    fn measure_text(&self, text: &str, style: TextStyle) -> f32;
}

/// Creates blank white page surfaces.
pub trait SurfaceFactory {
    type Surface: Surface;

    fn blank(&self, width_px: u32, height_px: u32) -> Self::Surface;
}
