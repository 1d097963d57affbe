use super::surface::{Anchor, Rect, Rgb, Surface, SurfaceFactory, TextStyle};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: Rgb },
    StrokeRect { rect: Rect, color: Rgb },
    RoundRect { rect: Rect, color: Rgb },
    Line { from: (f32, f32), to: (f32, f32), color: Rgb },
    Text {
        text: String,
        x: f32,
        y: f32,
        anchor: Anchor,
        style: TextStyle,
    },
}

/// Surface that keeps a log of drawing calls instead of pixels. Text is
/// measured at a fixed half-em advance per character.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width_px: u32,
    height_px: u32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drawn strings in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width_px(&self) -> u32 {
        self.width_px
    }

    fn height_px(&self) -> u32 {
        self.height_px
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb, _line_width: f32) {
        self.ops.push(DrawOp::StrokeRect { rect, color });
    }

    fn stroke_round_rect(&mut self, rect: Rect, _radius: f32, color: Rgb, _line_width: f32) {
        self.ops.push(DrawOp::RoundRect { rect, color });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, _line_width: f32) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, anchor: Anchor, style: TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            anchor,
            style,
        });
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
        text.chars().count() as f32 * style.size_px * 0.5
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingFactory;

impl SurfaceFactory for RecordingFactory {
    type Surface = RecordingSurface;

    fn blank(&self, width_px: u32, height_px: u32) -> RecordingSurface {
        RecordingSurface::new(width_px, height_px)
    }
}
