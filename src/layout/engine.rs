use tracing::debug;

use super::geometry::PageGeometry;
use super::surface::{Anchor, Rect, Rgb, Surface, SurfaceFactory, TextStyle};
use crate::model::{Cell, ClientView, InvoiceView, StatementPayload};

/// Body rows drawn under one table header before forcing a page break.
pub const MAX_ROWS_PER_PAGE: usize = 18;

/// Row height in points. Every table row has this height; cell text is
/// truncated rather than wrapped, so page breaks can be predicted from the
/// row count alone.
pub const ROW_HEIGHT_PT: f32 = 18.0;

/// Weight of the amount (last) column relative to the others.
const AMOUNT_COLUMN_WEIGHT: f32 = 1.15;

const ELLIPSIS: &str = "…";

pub const DEFAULT_BRAND_TITLE: &str = "الغدير نقل و تخليص";
pub const DEFAULT_BRAND_SUBTITLE: &str = "كشف حساب العميل (PDF)";
pub const CONTINUED_MARKER: &str = "متابعة...";

const INVOICE_FALLBACK: &str = "فاتورة";
const DATE_LABEL: &str = "تاريخ:";
const OPERATIONS_TITLE: &str = "العمليات";
const RECEIPTS_TITLE: &str = "القبوضات";
const FINAL_TITLE: &str = "الحساب النهائي";
const OPERATIONS_TOTAL: &str = "إجمالي العمليات";
const RECEIPTS_TOTAL: &str = "مجموع القبوضات";
const BALANCE_LABEL: &str = "الرصيد النهائي";

/// A finished page, never drawn on again.
#[derive(Debug, Clone)]
pub struct Page<S> {
    pub surface: S,
    pub width_px: u32,
    pub height_px: u32,
}

/// Document-level header text.
#[derive(Debug, Clone, Copy)]
pub struct StatementHeader<'a> {
    pub brand_title: &'a str,
    pub brand_sub: &'a str,
    pub client: &'a ClientView,
    pub range_text: &'a str,
}

/// Lay out a client statement onto as many pages as it needs.
///
/// The header page is always produced, so an empty invoice list yields
/// exactly one page.
pub fn render_statement<F: SurfaceFactory>(
    factory: &F,
    geometry: PageGeometry,
    header: &StatementHeader<'_>,
    invoices: &[InvoiceView],
) -> Vec<Page<F::Surface>> {
    let mut ctx = LayoutContext::new(factory, geometry);
    ctx.draw_header(header);
    for invoice in invoices {
        ctx.ensure_space(geometry.px(40.0));
        ctx.draw_invoice(invoice);
    }
    ctx.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Header,
    Body,
    Total,
}

/// Column positions for one table, resolved once per table.
#[derive(Debug, Clone)]
struct TableGrid {
    left: f32,
    width: f32,
    /// Column widths in data order; column 0 is drawn leftmost.
    widths: Vec<f32>,
}

impl TableGrid {
    fn new(left: f32, width: f32, columns: usize) -> Self {
        let columns = columns.max(1);
        let base = width / columns as f32;
        let mut widths = vec![base; columns];
        if columns >= 2 {
            let amount = base * AMOUNT_COLUMN_WEIGHT;
            let other = (width - amount) / (columns - 1) as f32;
            widths.fill(other);
            widths[columns - 1] = amount;
        }
        Self {
            left,
            width,
            widths,
        }
    }

    fn columns(&self) -> usize {
        self.widths.len()
    }

    /// Pads or cuts `cells` to the column count; missing cells are empty.
    fn reconcile(&self, cells: &[Cell]) -> Vec<String> {
        (0..self.columns())
            .map(|i| cells.get(i).map(Cell::to_string).unwrap_or_default())
            .collect()
    }
}

/// Owns the page being drawn and the vertical cursor.
pub struct LayoutContext<'f, F: SurfaceFactory> {
    factory: &'f F,
    geometry: PageGeometry,
    pages: Vec<Page<F::Surface>>,
    current: Option<F::Surface>,
    y: f32,
}

impl<'f, F: SurfaceFactory> LayoutContext<'f, F> {
    pub fn new(factory: &'f F, geometry: PageGeometry) -> Self {
        Self {
            factory,
            geometry,
            pages: Vec::new(),
            current: None,
            y: geometry.margin(),
        }
    }

    pub fn cursor(&self) -> f32 {
        self.y
    }

    /// Pages finalized so far, not counting the one in progress.
    pub fn finished_pages(&self) -> usize {
        self.pages.len()
    }

    /// Make sure `required_px` fits below the cursor, starting a new page
    /// if it does not. A block taller than a whole page is placed on a page
    /// that has nothing on it yet and allowed to overflow.
    pub fn ensure_space(&mut self, required_px: f32) {
        if self.current.is_none() {
            self.start_page();
        }
        if !self.fits(required_px) && !self.page_is_empty() {
            self.break_page();
        }
    }

    /// Finalize the current page and return every page in order.
    pub fn finish(mut self) -> Vec<Page<F::Surface>> {
        self.finalize_page();
        self.pages
    }

    fn fits(&self, required_px: f32) -> bool {
        self.y + required_px <= self.geometry.bottom_limit()
    }

    fn page_is_empty(&self) -> bool {
        self.y <= self.geometry.margin()
    }

    fn start_page(&mut self) {
        let surface = self
            .factory
            .blank(self.geometry.width_px(), self.geometry.height_px());
        self.current = Some(surface);
        self.y = self.geometry.margin();
    }

    fn finalize_page(&mut self) {
        if let Some(surface) = self.current.take() {
            self.pages.push(Page {
                width_px: surface.width_px(),
                height_px: surface.height_px(),
                surface,
            });
            debug!(page = self.pages.len(), "page finalized");
        }
    }

    fn break_page(&mut self) {
        self.finalize_page();
        self.start_page();
    }

    fn surface(&mut self) -> &mut F::Surface {
        if self.current.is_none() {
            self.y = self.geometry.margin();
        }
        let (factory, geometry) = (self.factory, self.geometry);
        self.current
            .get_or_insert_with(|| factory.blank(geometry.width_px(), geometry.height_px()))
    }

    fn px(&self, pt: f32) -> f32 {
        self.geometry.px(pt)
    }

    fn right_edge(&self) -> f32 {
        self.geometry.width_px() as f32 - self.geometry.margin()
    }

    fn text(&mut self, text: &str, x: f32, y: f32, anchor: Anchor, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        self.surface().fill_text(text, x, y, anchor, style);
    }

    fn rule(&mut self, color: Rgb) {
        let (left, right, y) = (self.geometry.margin(), self.right_edge(), self.y);
        let width = self.px(1.0);
        self.surface().line((left, y), (right, y), color, width);
    }

    fn draw_header(&mut self, header: &StatementHeader<'_>) {
        self.ensure_space(self.px(80.0));
        let right = self.right_edge();
        let title = TextStyle::new(self.px(22.0), Rgb::INK);
        let sub = TextStyle::new(self.px(13.0), Rgb::MUTED);
        let small = TextStyle::new(self.px(11.0), Rgb::MUTED);

        let brand_title = non_empty_or(header.brand_title, DEFAULT_BRAND_TITLE);
        self.text(brand_title, right, self.y, Anchor::Right, title);
        self.y += title.size_px + self.px(6.0);

        let brand_sub = non_empty_or(header.brand_sub, DEFAULT_BRAND_SUBTITLE);
        self.text(brand_sub, right, self.y, Anchor::Right, sub);
        self.y += sub.size_px + self.px(8.0);

        let client = header.client;
        let client_line = format!("{} — {} — {}", client.name, client.phone, client.location);
        self.text(&client_line, right, self.y, Anchor::Right, small);
        self.y += small.size_px + self.px(4.0);

        self.text(header.range_text, right, self.y, Anchor::Right, small);
        self.y += small.size_px + self.px(10.0);

        self.rule(Rgb::BORDER);
        self.y += self.px(12.0);
    }

    fn draw_invoice(&mut self, invoice: &InvoiceView) {
        let head = TextStyle::new(self.px(14.0), Rgb::INK);
        let small = TextStyle::new(self.px(11.0), Rgb::MUTED);
        let margin = self.geometry.margin();
        let right = self.right_edge() - self.px(10.0);

        self.ensure_space(self.px(46.0) + self.section_reserve());
        self.rule(Rgb::BORDER);
        let top = self.y;
        let name = non_empty_or(&invoice.name, INVOICE_FALLBACK);
        self.text(name, right, top + self.px(10.0), Anchor::Right, head);
        let date = format!("{} {}", DATE_LABEL, non_empty_or(&invoice.date, "-"));
        let date_x = margin + self.px(10.0);
        self.text(&date, date_x, top + self.px(12.0), Anchor::Left, small);
        self.y += self.px(46.0);

        self.draw_section_title(OPERATIONS_TITLE);
        self.draw_table(
            &invoice.t1,
            OPERATIONS_TOTAL,
            &format_amount(invoice.s1, &invoice.sym),
        );

        self.draw_section_title(RECEIPTS_TITLE);
        self.draw_table(
            &invoice.t2,
            RECEIPTS_TOTAL,
            &format_amount(invoice.s2, &invoice.sym),
        );

        self.draw_final_account(invoice);

        // a separator alone never opens a new page
        if self.fits(self.px(9.0)) {
            self.rule(Rgb::SEPARATOR);
        }
        self.y += self.px(14.0);
    }

    /// Room for a section title plus the start of its table, so a title is
    /// never left alone at the bottom of a page.
    fn section_reserve(&self) -> f32 {
        self.px(14.0) + self.px(8.0) + self.px(ROW_HEIGHT_PT) * 4.0
    }

    fn draw_section_title(&mut self, title: &str) {
        self.ensure_space(self.section_reserve());
        let head = TextStyle::new(self.px(14.0), Rgb::INK);
        let right = self.right_edge() - self.px(10.0);
        self.text(title, right, self.y, Anchor::Right, head);
        self.y += head.size_px + self.px(8.0);
    }

    fn draw_table(&mut self, payload: &StatementPayload, total_label: &str, total_value: &str) {
        let inset = self.geometry.margin() + self.px(10.0);
        let width = self.geometry.width_px() as f32 - inset * 2.0;
        let grid = TableGrid::new(inset, width, payload.column_count());
        let header = grid.reconcile(
            &payload
                .header_titles
                .iter()
                .map(|t| Cell::Text(t.clone()))
                .collect::<Vec<_>>(),
        );
        let row_h = self.px(ROW_HEIGHT_PT);
        let row_reserve = row_h + self.px(18.0);

        self.ensure_space(row_h * 4.0);
        self.draw_grid_row(&grid, &header, RowKind::Header);

        let mut printed = 0;
        for row in &payload.rows {
            if printed >= MAX_ROWS_PER_PAGE || !self.fits(row_reserve) {
                self.continue_table(&grid, &header);
                printed = 0;
            }
            let cells = grid.reconcile(row);
            self.draw_grid_row(&grid, &cells, RowKind::Body);
            printed += 1;
        }

        if !self.fits(row_reserve) {
            self.continue_table(&grid, &header);
        }
        let mut totals = vec![String::new(); grid.columns()];
        let last = grid.columns() - 1;
        if last >= 1 {
            totals[last - 1] = total_label.to_string();
        }
        totals[last] = total_value.to_string();
        self.draw_grid_row(&grid, &totals, RowKind::Total);

        self.y += self.px(10.0);
    }

    fn continue_table(&mut self, grid: &TableGrid, header: &[String]) {
        self.break_page();
        debug!(page = self.pages.len() + 1, "table continues");
        let marker = TextStyle::new(self.px(11.0), Rgb::MUTED);
        let right = self.right_edge();
        self.text(CONTINUED_MARKER, right, self.y, Anchor::Right, marker);
        self.y += self.px(18.0);
        self.draw_grid_row(grid, header, RowKind::Header);
    }

    fn draw_grid_row(&mut self, grid: &TableGrid, texts: &[String], kind: RowKind) {
        let height = self.px(ROW_HEIGHT_PT) + self.px(2.0);
        let pad = self.px(6.0);
        let line_width = self.px(1.0);
        let regular = TextStyle::new(self.px(11.0), Rgb::INK);
        let (fill, style) = match kind {
            RowKind::Header => (Rgb::HEADER_FILL, regular.bold()),
            RowKind::Body => (Rgb::WHITE, regular),
            RowKind::Total => (Rgb::TOTAL_FILL, regular.bold()),
        };

        let y = self.y;
        let surface = self.surface();
        surface.fill_rect(Rect::new(grid.left, y, grid.width, height), fill);

        let mut x = grid.left;
        for (width, text) in grid.widths.iter().zip(texts) {
            surface.stroke_rect(Rect::new(x, y, *width, height), Rgb::GRID, line_width);
            let clipped = ellipsize(&*surface, text, width - pad * 2.0, style);
            if !clipped.is_empty() {
                surface.fill_text(&clipped, x + width - pad, y + pad, Anchor::Right, style);
            }
            x += width;
        }
        self.y += height;
    }

    fn draw_final_account(&mut self, invoice: &InvoiceView) {
        let head = TextStyle::new(self.px(14.0), Rgb::INK);
        let small = TextStyle::new(self.px(11.0), Rgb::MUTED);
        let box_h = self.px(92.0);
        let margin = self.geometry.margin();
        let block_w = self.geometry.width_px() as f32 - margin * 2.0;

        self.ensure_space(head.size_px + self.px(8.0) + box_h + self.px(18.0));
        let right = self.right_edge() - self.px(10.0);
        self.text(FINAL_TITLE, right, self.y, Anchor::Right, head);
        self.y += head.size_px + self.px(8.0);

        let frame = Rect::new(margin + self.px(10.0), self.y, block_w - self.px(20.0), box_h);
        let (radius, line_width) = (self.px(12.0), self.px(1.0));
        self.surface()
            .stroke_round_rect(frame, radius, Rgb::BORDER, line_width);

        let label_x = self.right_edge() - self.px(22.0);
        let value_x = margin + self.px(22.0);
        let pairs = [
            (OPERATIONS_TOTAL, invoice.s1, Rgb::MUTED, 12.0),
            (RECEIPTS_TOTAL, invoice.s2, Rgb::MUTED, 40.0),
            (BALANCE_LABEL, invoice.bal(), Rgb::INK, 68.0),
        ];
        for (label, value, color, dy) in pairs {
            let y = self.y + self.px(dy);
            self.text(label, label_x, y, Anchor::Right, TextStyle { color, ..small });
            let value = format_amount(value, &invoice.sym);
            let value_style = TextStyle {
                color: Rgb::INK,
                ..small
            };
            self.text(&value, value_x, y, Anchor::Left, value_style);
        }

        self.y += box_h + self.px(18.0);
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Number followed directly by the currency symbol, e.g. `1250$`.
pub fn format_amount(value: f64, sym: &str) -> String {
    // -0 prints as "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}{sym}")
}

/// Cut `text` to fit `max_width`, marking the cut with an ellipsis.
///
/// Binary search over char boundaries for the longest prefix that still fits
/// with the ellipsis appended.
fn ellipsize<S>(surface: &S, text: &str, max_width: f32, style: TextStyle) -> String
where
    S: Surface + ?Sized,
{
    if text.is_empty() || surface.measure_text(text, style) <= max_width {
        return text.to_string();
    }
    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let candidate = |chars: usize| format!("{}{ELLIPSIS}", &text[..bounds[chars]]);

    // prefix of `lo` chars fits, prefix of `hi` chars does not
    let (mut lo, mut hi) = (0, bounds.len());
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if surface.measure_text(&candidate(mid), style) <= max_width {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    candidate(lo)
}
