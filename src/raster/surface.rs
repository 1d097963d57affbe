use std::ops::Range;

use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::{Direction, Face, UnicodeBuffer};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};
use tracing::{debug, warn};
use unicode_bidi::{BidiInfo, Level};

use super::font::FontData;
use crate::error::{Result, StatementError};
use crate::layout::{Anchor, PageGeometry, Rect, Rgb, Surface, SurfaceFactory, TextStyle};

/// Advance used per character when no font is available, in ems.
const FALLBACK_ADVANCE_EM: f32 = 0.5;

/// Outline stroke added to regular glyphs to fake a bold weight, in ems.
const FAUX_BOLD_EM: f32 = 0.04;

/// Page surface backed by a tiny-skia pixmap.
#[derive(Clone)]
pub struct RasterSurface<'f> {
    pixmap: Pixmap,
    face: Option<Face<'f>>,
}

impl RasterSurface<'_> {
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Creates white pages of one fixed size. The font is parsed once here and
/// shared by every page.
pub struct RasterFactory<'f> {
    template: Pixmap,
    face: Option<Face<'f>>,
}

impl<'f> RasterFactory<'f> {
    pub fn new(geometry: PageGeometry, font: Option<&'f FontData>) -> Result<Self> {
        let (width, height) = (geometry.width_px(), geometry.height_px());
        let mut template = Pixmap::new(width, height).ok_or_else(|| {
            StatementError::Configuration(format!("invalid raster size {width}x{height}"))
        })?;
        template.fill(tiny_skia::Color::WHITE);

        let face = font.and_then(|font| {
            let face = Face::from_slice(font.bytes(), 0);
            match &face {
                Some(_) => debug!(path = %font.path().display(), "rasterizing with font"),
                None => warn!(path = %font.path().display(), "font could not be parsed"),
            }
            face
        });
        if face.is_none() {
            warn!("no font available, text will not be drawn");
        }
        Ok(Self { template, face })
    }
}

impl<'f> SurfaceFactory for RasterFactory<'f> {
    type Surface = RasterSurface<'f>;

    fn blank(&self, width_px: u32, height_px: u32) -> RasterSurface<'f> {
        debug_assert_eq!((width_px, height_px), (self.template.width(), self.template.height()));
        RasterSurface {
            pixmap: self.template.clone(),
            face: self.face.clone(),
        }
    }
}

impl Surface for RasterSurface<'_> {
    fn width_px(&self) -> u32 {
        self.pixmap.width()
    }

    fn height_px(&self) -> u32 {
        self.pixmap.height()
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        if let Some(rect) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.w, rect.h) {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), None);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgb, line_width: f32) {
        let Some(rect) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.w, rect.h) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        self.stroke(&path, color, line_width);
    }

    fn stroke_round_rect(&mut self, rect: Rect, radius: f32, color: Rgb, line_width: f32) {
        if let Some(path) = round_rect_path(rect, radius) {
            self.stroke(&path, color, line_width);
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, line_width: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        if let Some(path) = pb.finish() {
            self.stroke(&path, color, line_width);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, anchor: Anchor, style: TextStyle) {
        let Some(face) = &self.face else {
            return;
        };
        let line = shape_line(face, text, style.size_px);
        let start_x = match anchor {
            Anchor::Right => x - line.advance,
            Anchor::Left => x,
        };
        let baseline = y + face.ascender() as f32 * line.scale;

        let paint = paint(style.color);
        let bold = style.bold.then(|| Stroke {
            width: style.size_px * FAUX_BOLD_EM,
            ..Stroke::default()
        });
        let mut paths = Vec::with_capacity(line.glyphs.len());
        for glyph in &line.glyphs {
            let mut builder =
                GlyphPathBuilder::new(start_x + glyph.x, baseline - glyph.y, line.scale);
            if face.outline_glyph(GlyphId(glyph.id), &mut builder).is_none() {
                continue;
            }
            paths.extend(builder.finish());
        }
        for path in &paths {
            self.pixmap
                .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
            if let Some(stroke) = &bold {
                self.pixmap
                    .stroke_path(path, &paint, stroke, Transform::identity(), None);
            }
        }
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
        match &self.face {
            Some(face) => shape_line(face, text, style.size_px).advance,
            None => text.chars().count() as f32 * style.size_px * FALLBACK_ADVANCE_EM,
        }
    }
}

impl RasterSurface<'_> {
    fn stroke(&mut self, path: &Path, color: Rgb, line_width: f32) {
        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
    }
}

struct PlacedGlyph {
    id: u16,
    /// Byte offset of the source cluster in the shaped text.
    cluster: usize,
    /// Offset from the line origin in pixels, y up.
    x: f32,
    y: f32,
}

struct ShapedLine {
    /// Glyphs in visual left-to-right order.
    glyphs: Vec<PlacedGlyph>,
    advance: f32,
    scale: f32,
}

/// Directional runs of a single line in visual left-to-right order. The
/// paragraph is right to left, so Latin digits and words inside Arabic text
/// keep their own order.
fn visual_runs(text: &str) -> Vec<(Range<usize>, Direction)> {
    let bidi = BidiInfo::new(text, Some(Level::rtl()));
    let mut out = Vec::new();
    for para in &bidi.paragraphs {
        let (levels, runs) = bidi.visual_runs(para, para.range.clone());
        for run in runs {
            let direction = if levels[run.start].is_rtl() {
                Direction::RightToLeft
            } else {
                Direction::LeftToRight
            };
            out.push((run, direction));
        }
    }
    out
}

/// Shape each directional run on its own and lay the runs out side by side.
fn shape_line(face: &Face<'_>, text: &str, size_px: f32) -> ShapedLine {
    let scale = size_px / face.units_per_em().max(1) as f32;
    let mut glyphs = Vec::new();
    let mut pen_x = 0.0f32;

    for (range, direction) in visual_runs(text) {
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(&text[range.clone()]);
        buffer.set_direction(direction);
        let output = rustybuzz::shape(face, &[], buffer);

        for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
            if info.glyph_id != 0 {
                glyphs.push(PlacedGlyph {
                    id: info.glyph_id as u16,
                    cluster: range.start + info.cluster as usize,
                    x: pen_x + pos.x_offset as f32 * scale,
                    y: pos.y_offset as f32 * scale,
                });
            }
            pen_x += pos.x_advance as f32 * scale;
        }
    }

    ShapedLine {
        glyphs,
        advance: pen_x,
        scale,
    }
}

fn round_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    let Rect { x, y, w, h } = rect;
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = true;
    paint
}

/// Converts font units (y up) to device pixels (y down) around a glyph origin.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y - y * self.scale)
    }

    fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
