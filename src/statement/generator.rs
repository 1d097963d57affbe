use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{load_config, resolve_output_dir};
use crate::error::{Result, StatementError};
use crate::layout::{render_statement, PageGeometry, StatementHeader};
use crate::model::{ClientView, InvoiceRecord, InvoiceView, StatementData};
use crate::pdf::build_pdf;
use crate::raster::{encode_jpeg, FontData, RasterFactory};

/// Optional inclusive date bounds for the invoices on a statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        Ok(Self {
            from: from.map(parse_date).transpose()?,
            to: to.map(parse_date).transpose()?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Unbounded ranges keep every invoice; otherwise the invoice date must
    /// parse and fall within the bounds.
    pub fn contains(&self, record: &InvoiceRecord) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = record.parsed_date() else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| StatementError::InvalidDate(input.to_string()))
}

fn bound_text(bound: Option<NaiveDate>) -> String {
    bound.map_or_else(|| "...".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Period and generation date line shown under the client name.
pub fn range_text(range: &DateRange, generated: NaiveDate) -> String {
    let generated = generated.format("%Y-%m-%d");
    if range.is_unbounded() {
        format!("المدة: كل الفواتير | تاريخ الإخراج: {generated}")
    } else {
        format!(
            "المدة: {} → {} | تاريخ الإخراج: {generated}",
            bound_text(range.from),
            bound_text(range.to)
        )
    }
}

/// Default PDF file name for a client statement.
pub fn output_file_name(client_name: &str, range: &DateRange) -> String {
    let name = client_name.split_whitespace().collect::<Vec<_>>().join("_");
    let base = if name.is_empty() { "عميل".to_string() } else { name };
    if range.is_unbounded() {
        format!("كشف_{base}.pdf")
    } else {
        format!(
            "كشف_{base}_{}_{}.pdf",
            bound_text(range.from),
            bound_text(range.to)
        )
    }
}

/// Read a statement data file (JSON).
pub fn load_statement_data(path: &Path) -> Result<StatementData> {
    if !path.exists() {
        return Err(StatementError::DataFileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| StatementError::DataParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The client as displayed, with the configured currency filled in when
/// the data file has none.
pub fn display_client(data: &StatementData, default_currency: &str) -> ClientView {
    let mut client = data.client.clone();
    if client.currency.trim().is_empty() {
        client.currency = default_currency.to_string();
    }
    client
}

/// Views for the invoices inside `range`, in data-file order.
pub fn invoice_views(
    data: &StatementData,
    client: &ClientView,
    range: &DateRange,
) -> Vec<InvoiceView> {
    data.invoices
        .iter()
        .filter(|record| range.contains(record))
        .map(|record| InvoiceView::from_record(record, client))
        .collect()
}

/// Everything needed to turn statement data into PDF bytes.
pub struct RenderOptions<'a> {
    pub brand_title: &'a str,
    pub brand_sub: &'a str,
    pub geometry: PageGeometry,
    pub jpeg_quality: u8,
    pub font: Option<FontData>,
}

#[derive(Debug)]
pub struct RenderedStatement {
    pub pdf: Vec<u8>,
    pub pages: usize,
}

/// Lay out, rasterize and assemble a statement in memory.
pub fn build_statement_pdf(
    options: RenderOptions<'_>,
    client: &ClientView,
    invoices: &[InvoiceView],
    range_text: &str,
) -> Result<RenderedStatement> {
    let factory = RasterFactory::new(options.geometry, options.font.as_ref())?;
    let header = StatementHeader {
        brand_title: options.brand_title,
        brand_sub: options.brand_sub,
        client,
        range_text,
    };
    let pages = render_statement(&factory, options.geometry, &header, invoices);

    let images = pages
        .iter()
        .enumerate()
        .map(|(index, page)| encode_jpeg(page, options.jpeg_quality, index))
        .collect::<Result<Vec<_>>>()?;
    let pdf = build_pdf(&images, options.geometry.page_size())?;

    Ok(RenderedStatement {
        pdf,
        pages: images.len(),
    })
}

/// Request for `generate_statement`; unset fields fall back to config.
#[derive(Debug, Default)]
pub struct GenerateRequest {
    pub data_path: PathBuf,
    pub from: Option<String>,
    pub to: Option<String>,
    pub output: Option<PathBuf>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

#[derive(Debug)]
pub struct GeneratedStatement {
    pub path: PathBuf,
    pub client: String,
    pub invoices: usize,
    pub pages: usize,
    pub bytes: usize,
}

/// Render a statement PDF for the data file and write it to disk.
pub fn generate_statement(
    cfg_dir: &Path,
    request: &GenerateRequest,
    today: NaiveDate,
) -> Result<GeneratedStatement> {
    let config = load_config(cfg_dir)?;
    let geometry = config.page.geometry()?;
    let range = DateRange::parse(request.from.as_deref(), request.to.as_deref())?;

    let data = load_statement_data(&request.data_path)?;
    let client = display_client(&data, &config.render.default_currency);
    let invoices = invoice_views(&data, &client, &range);

    let font = match &config.render.font {
        Some(path) => Some(FontData::load(&crate::config::expand_path(path))?),
        None => FontData::discover(),
    };

    let options = RenderOptions {
        brand_title: request.title.as_deref().unwrap_or(&config.brand.title),
        brand_sub: request.subtitle.as_deref().unwrap_or(&config.brand.subtitle),
        geometry,
        jpeg_quality: config.render.jpeg_quality,
        font,
    };
    let rendered = build_statement_pdf(options, &client, &invoices, &range_text(&range, today))?;

    let path = match &request.output {
        Some(path) => path.clone(),
        None => {
            let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
            fs::create_dir_all(&output_dir)?;
            output_dir.join(output_file_name(&client.name, &range))
        }
    };
    fs::write(&path, &rendered.pdf)?;
    info!(path = %path.display(), pages = rendered.pages, "statement written");

    Ok(GeneratedStatement {
        path,
        client: client.name,
        invoices: invoices.len(),
        pages: rendered.pages,
        bytes: rendered.pdf.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, StatementPayload};

    fn record(date: &str) -> InvoiceRecord {
        InvoiceRecord {
            date: date.to_string(),
            ..Default::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = DateRange::parse(Some("2025-01-01"), Some("2025-01-31")).unwrap();
        assert!(range.contains(&record("2025-01-01")));
        assert!(range.contains(&record("2025-01-31")));
        assert!(!range.contains(&record("2025-02-01")));
        assert!(!range.contains(&record("")));
    }

    #[test]
    fn unbounded_range_keeps_undated_invoices() {
        let range = DateRange::default();
        assert!(range.contains(&record("")));
        assert!(range.contains(&record("not a date")));
    }

    #[test]
    fn open_ended_range() {
        let range = DateRange::parse(Some("2025-03-01"), None).unwrap();
        assert!(range.contains(&record("2030-01-01")));
        assert!(!range.contains(&record("2025-02-28")));
    }

    #[test]
    fn bad_date_is_rejected() {
        let err = DateRange::parse(Some("01/02/2025"), None).unwrap_err();
        assert!(matches!(err, StatementError::InvalidDate(_)));
    }

    #[test]
    fn range_text_formats() {
        let today = date("2025-06-15");
        assert_eq!(
            range_text(&DateRange::default(), today),
            "المدة: كل الفواتير | تاريخ الإخراج: 2025-06-15"
        );
        let range = DateRange::parse(None, Some("2025-05-31")).unwrap();
        assert_eq!(
            range_text(&range, today),
            "المدة: ... → 2025-05-31 | تاريخ الإخراج: 2025-06-15"
        );
    }

    #[test]
    fn file_names() {
        assert_eq!(output_file_name("شركة  النور", &DateRange::default()), "كشف_شركة_النور.pdf");
        assert_eq!(output_file_name(" ", &DateRange::default()), "كشف_عميل.pdf");
        let range = DateRange::parse(Some("2025-01-01"), None).unwrap();
        assert_eq!(output_file_name("Acme", &range), "كشف_Acme_2025-01-01_....pdf");
    }

    #[test]
    fn client_currency_falls_back_to_config() {
        let data = StatementData::default();
        assert_eq!(display_client(&data, "IQD").currency, "IQD");
    }

    #[test]
    fn views_follow_filter_and_order() {
        let payload = StatementPayload {
            header_titles: vec!["المبلغ".into()],
            rows: vec![vec![Cell::Number(10.0)]],
        };
        let mut a = record("2025-01-10");
        a.name = "a".into();
        a.t1 = Some(payload);
        let mut b = record("2024-12-01");
        b.name = "b".into();
        let mut c = record("2025-01-20");
        c.name = "c".into();
        let data = StatementData {
            client: ClientView::default(),
            invoices: vec![a, b, c],
        };
        let range = DateRange::parse(Some("2025-01-01"), None).unwrap();
        let views = invoice_views(&data, &data.client, &range);
        let names: Vec<_> = views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(views[0].s1, 10.0);
        assert_eq!(views[0].sym, "$");
    }

    #[test]
    fn builds_a_pdf_without_fonts() {
        let client = ClientView::default();
        let options = RenderOptions {
            brand_title: "",
            brand_sub: "",
            geometry: PageGeometry::a4(),
            jpeg_quality: 80,
            font: None,
        };
        let rendered = build_statement_pdf(options, &client, &[], "").unwrap();
        assert_eq!(rendered.pages, 1);
        assert!(rendered.pdf.starts_with(b"%PDF-1.4"));
        assert!(rendered.pdf.ends_with(b"%%EOF"));
    }
}
