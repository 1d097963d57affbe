mod engine;
mod geometry;
mod recording;
mod surface;

pub use engine::{
    format_amount, render_statement, LayoutContext, Page, StatementHeader, CONTINUED_MARKER,
    DEFAULT_BRAND_SUBTITLE, DEFAULT_BRAND_TITLE, MAX_ROWS_PER_PAGE, ROW_HEIGHT_PT,
};
pub use geometry::{PageGeometry, DEFAULT_SCALE};
pub use recording::{DrawOp, RecordingFactory, RecordingSurface};
pub use surface::{Anchor, Rect, Rgb, Surface, SurfaceFactory, TextStyle};
