use tracing::debug;

use crate::error::{Result, StatementError};

/// Leading bytes of every JPEG stream (start-of-image marker).
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Header line plus a comment of four high-bit bytes so naive tools treat
/// the file as binary.
const PDF_HEADER: &[u8] = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n";

/// One pre-encoded page raster.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Baseline JPEG bytes, embedded verbatim.
    pub bytes: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

/// Page size in PDF user-space units (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Object number; generation is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ObjId(usize);

impl ObjId {
    fn reference(self) -> String {
        format!("{} 0 R", self.0)
    }
}

/// Index-based table of indirect objects. Ids are handed out in order and
/// bodies may be filled in later, so an object can be referenced before it
/// is written.
#[derive(Default)]
struct ObjectTable {
    bodies: Vec<Option<Vec<u8>>>,
}

impl ObjectTable {
    fn reserve(&mut self) -> ObjId {
        self.bodies.push(None);
        ObjId(self.bodies.len())
    }

    fn fill(&mut self, id: ObjId, body: Vec<u8>) {
        self.bodies[id.0 - 1] = Some(body);
    }

    fn add(&mut self, body: Vec<u8>) -> ObjId {
        let id = self.reserve();
        self.fill(id, body);
        id
    }

    fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Writes every object in number order, then the xref table and trailer.
    fn serialize(self, root: ObjId) -> Vec<u8> {
        let payload: usize = self
            .bodies
            .iter()
            .map(|b| b.as_ref().map_or(0, Vec::len) + 32)
            .sum();
        let mut out = Vec::with_capacity(PDF_HEADER.len() + payload + 20 * (self.len() + 8));
        out.extend_from_slice(PDF_HEADER);

        let count = self.len();
        let mut offsets = Vec::with_capacity(count);
        for (index, body) in self.bodies.into_iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            if let Some(body) = body {
                out.extend_from_slice(&body);
            }
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_start = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", count + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} >>\nstartxref\n{}\n%%EOF",
                count + 1,
                root.reference(),
                xref_start
            )
            .as_bytes(),
        );
        out
    }
}

/// Build a PDF with one full-bleed image per page, in input order.
///
/// Images must already be JPEG encoded; their bytes are copied into
/// `/DCTDecode` streams untouched. Nothing is returned unless every image
/// validates.
pub fn build_pdf(images: &[PageImage], page: PageSize) -> Result<Vec<u8>> {
    validate_page_size(page)?;
    for (index, image) in images.iter().enumerate() {
        validate_image(index, image)?;
    }

    let width = format_number(page.width);
    let height = format_number(page.height);
    let mut table = ObjectTable::default();

    // Image XObject then content stream, per page.
    let mut placed = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        let name = format!("Im{index}");
        let image_id = table.add(image_object(image));
        let content_id = table.add(content_object(&name, &width, &height));
        placed.push((name, image_id, content_id));
    }

    // Page ids are reserved before the page tree so each page can name its
    // parent; the page tree follows the last page.
    let page_ids: Vec<ObjId> = placed.iter().map(|_| table.reserve()).collect();
    let pages_id = table.reserve();
    for ((name, image_id, content_id), page_id) in placed.iter().zip(&page_ids) {
        let body = format!(
            "<<\n/Type /Page\n/Parent {}\n/Resources << /XObject << /{} {} >> >>\n/MediaBox [0 0 {} {}]\n/Contents {}\n>>",
            pages_id.reference(),
            name,
            image_id.reference(),
            width,
            height,
            content_id.reference()
        );
        table.fill(*page_id, body.into_bytes());
    }

    let kids = page_ids
        .iter()
        .map(|id| id.reference())
        .collect::<Vec<_>>()
        .join(" ");
    table.fill(
        pages_id,
        format!(
            "<<\n/Type /Pages\n/Count {}\n/Kids [ {} ]\n>>",
            page_ids.len(),
            kids
        )
        .into_bytes(),
    );

    let catalog_id = table.add(
        format!("<<\n/Type /Catalog\n/Pages {}\n>>", pages_id.reference()).into_bytes(),
    );

    let objects = table.len();
    let out = table.serialize(catalog_id);
    debug!(pages = images.len(), objects, bytes = out.len(), "pdf assembled");
    Ok(out)
}

fn validate_page_size(page: PageSize) -> Result<()> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(page.width) || !valid(page.height) {
        return Err(StatementError::Configuration(format!(
            "page size must be positive, got {}x{}",
            page.width, page.height
        )));
    }
    Ok(())
}

fn validate_image(index: usize, image: &PageImage) -> Result<()> {
    if image.bytes.is_empty() {
        return Err(StatementError::Validation {
            index,
            reason: "image has no bytes".to_string(),
        });
    }
    if image.width_px == 0 || image.height_px == 0 {
        return Err(StatementError::Validation {
            index,
            reason: format!(
                "dimensions must be positive, got {}x{}",
                image.width_px, image.height_px
            ),
        });
    }
    if !image.bytes.starts_with(&JPEG_SOI) {
        return Err(StatementError::Encoding {
            index,
            reason: "bytes are not a JPEG stream".to_string(),
        });
    }
    Ok(())
}

fn image_object(image: &PageImage) -> Vec<u8> {
    let dict = format!(
        "<<\n/Type /XObject\n/Subtype /Image\n/Width {}\n/Height {}\n/ColorSpace /DeviceRGB\n/BitsPerComponent 8\n/Filter /DCTDecode\n/Length {}\n>>\nstream\n",
        image.width_px,
        image.height_px,
        image.bytes.len()
    );
    let mut body = Vec::with_capacity(dict.len() + image.bytes.len() + 10);
    body.extend_from_slice(dict.as_bytes());
    body.extend_from_slice(&image.bytes);
    body.extend_from_slice(b"\nendstream");
    body
}

/// Stamp one image over the whole page: save, scale the unit square, draw, restore.
fn content_object(name: &str, width: &str, height: &str) -> Vec<u8> {
    let stream = format!("q\n{width} 0 0 {height} 0 0 cm\n/{name} Do\nQ\n");
    format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        stream.len(),
        stream
    )
    .into_bytes()
}

/// Shortest decimal form, no trailing zeros (`595.28`, `600`).
fn format_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_jpeg(len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        bytes[0] = 0xFF;
        bytes[1] = 0xD8;
        bytes[len - 2] = 0xFF;
        bytes[len - 1] = 0xD9;
        bytes
    }

    fn page(len: usize) -> PageImage {
        PageImage {
            bytes: fake_jpeg(len),
            width_px: 1190,
            height_px: 1684,
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    /// Returns (xref offset from startxref, object offsets from the table).
    fn parse_xref(pdf: &[u8]) -> (usize, Vec<usize>) {
        let start_kw = pdf
            .windows(9)
            .rposition(|w| w == b"startxref")
            .expect("startxref");
        let tail = text(&pdf[start_kw + 10..]);
        let xref_start: usize = tail.lines().next().unwrap().trim().parse().unwrap();

        let table = text(&pdf[xref_start..]);
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("xref"));
        let header = lines.next().unwrap();
        let size: usize = header.split(' ').nth(1).unwrap().parse().unwrap();
        assert_eq!(lines.next(), Some("0000000000 65535 f "));
        let offsets = (1..size)
            .map(|_| {
                let line = lines.next().unwrap();
                assert_eq!(line.len(), 19);
                assert!(line.ends_with(" 00000 n "));
                line[..10].parse().unwrap()
            })
            .collect();
        (xref_start, offsets)
    }

    #[test]
    fn single_page_document_layout() {
        let pdf = build_pdf(&[page(100)], PageSize::A4).unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert_eq!(&pdf[9..15], b"%\xE2\xE3\xCF\xD3\n");
        assert!(pdf.ends_with(b"%%EOF"));
        assert_eq!(count(&pdf, b"/Subtype /Image"), 1);
        assert!(find(&pdf, b"/Length 100\n").is_some());
        assert!(find(&pdf, b"/Width 1190\n/Height 1684\n").is_some());
        assert!(find(&pdf, b"q\n595.28 0 0 841.89 0 0 cm\n/Im0 Do\nQ\n").is_some());
        assert!(find(&pdf, b"/MediaBox [0 0 595.28 841.89]").is_some());
    }

    #[test]
    fn image_bytes_are_embedded_verbatim() {
        let image = page(64);
        let pdf = build_pdf(std::slice::from_ref(&image), PageSize::A4).unwrap();
        let start = find(&pdf, b"stream\n").unwrap() + 7;
        assert_eq!(&pdf[start..start + 64], image.bytes.as_slice());
        assert_eq!(&pdf[start + 64..start + 74], b"\nendstream");
    }

    #[test]
    fn xref_offsets_point_at_object_headers() {
        let pdf = build_pdf(&[page(100), page(250), page(40)], PageSize::A4).unwrap();
        let (xref_start, offsets) = parse_xref(&pdf);

        assert_eq!(&pdf[xref_start..xref_start + 5], b"xref\n");
        // 3 images + 3 contents + 3 pages + pages + catalog
        assert_eq!(offsets.len(), 11);
        for (index, offset) in offsets.iter().enumerate() {
            let header = format!("{} 0 obj\n", index + 1);
            assert!(
                pdf[*offset..].starts_with(header.as_bytes()),
                "object {} not at offset {}",
                index + 1,
                offset
            );
        }
        assert!(find(&pdf, b"trailer\n<< /Size 12 /Root 11 0 R >>\nstartxref\n").is_some());
    }

    #[test]
    fn page_tree_links_resolve() {
        let pdf = build_pdf(&[page(100), page(100)], PageSize::A4).unwrap();
        let (_, offsets) = parse_xref(&pdf);

        // Objects: 1-4 image/content pairs, 5-6 pages, 7 page tree, 8 catalog.
        let object = |n: usize| {
            let start = offsets[n - 1];
            let end = start + find(&pdf[start..], b"endobj").unwrap();
            text(&pdf[start..end])
        };
        assert!(object(5).contains("/Type /Page\n/Parent 7 0 R"));
        assert!(object(5).contains("/XObject << /Im0 1 0 R >>"));
        assert!(object(5).contains("/Contents 2 0 R"));
        assert!(object(6).contains("/XObject << /Im1 3 0 R >>"));
        assert!(object(6).contains("/Contents 4 0 R"));
        assert!(object(7).contains("/Type /Pages\n/Count 2\n/Kids [ 5 0 R 6 0 R ]"));
        assert!(object(8).contains("/Type /Catalog\n/Pages 7 0 R"));
        assert_eq!(count(&pdf, b"/Type /Page\n"), 2);
    }

    #[test]
    fn content_stream_length_matches_body() {
        let pdf = build_pdf(&[page(100)], PageSize::A4).unwrap();
        let stream = b"q\n595.28 0 0 841.89 0 0 cm\n/Im0 Do\nQ\n";
        let expected = format!("<< /Length {} >>\nstream\n", stream.len());
        assert!(find(&pdf, expected.as_bytes()).is_some());
    }

    #[test]
    fn custom_page_size_is_used_everywhere() {
        let size = PageSize {
            width: 600.0,
            height: 800.5,
        };
        let pdf = build_pdf(&[page(100)], size).unwrap();
        assert!(find(&pdf, b"q\n600 0 0 800.5 0 0 cm\n").is_some());
        assert!(find(&pdf, b"/MediaBox [0 0 600 800.5]").is_some());
    }

    #[test]
    fn empty_input_still_produces_a_document() {
        let pdf = build_pdf(&[], PageSize::A4).unwrap();
        assert!(find(&pdf, b"/Count 0\n/Kids [  ]").is_some());
        let (_, offsets) = parse_xref(&pdf);
        assert_eq!(offsets.len(), 2);
    }

    #[test]
    fn rejects_empty_bytes() {
        let image = PageImage {
            bytes: Vec::new(),
            width_px: 10,
            height_px: 10,
        };
        let err = build_pdf(&[page(100), image], PageSize::A4).unwrap_err();
        assert!(matches!(err, StatementError::Validation { index: 1, .. }));
    }

    #[test]
    fn rejects_zero_dimensions() {
        let mut image = page(100);
        image.height_px = 0;
        let err = build_pdf(&[image], PageSize::A4).unwrap_err();
        assert!(matches!(err, StatementError::Validation { index: 0, .. }));
    }

    #[test]
    fn rejects_non_jpeg_bytes() {
        let image = PageImage {
            bytes: b"\x89PNG\r\n\x1a\n".to_vec(),
            width_px: 10,
            height_px: 10,
        };
        let err = build_pdf(&[image], PageSize::A4).unwrap_err();
        assert!(matches!(err, StatementError::Encoding { index: 0, .. }));
    }

    #[test]
    fn rejects_non_positive_page_size() {
        let size = PageSize {
            width: 0.0,
            height: 841.89,
        };
        let err = build_pdf(&[page(100)], size).unwrap_err();
        assert!(matches!(err, StatementError::Configuration(_)));
    }
}
