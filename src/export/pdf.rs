//! Attendance report as PDF.
//!
//! Text is set in an embedded TrueType font so names keep their characters.
//! DejaVu Sans ships with the crate and covers Latin, Greek and Cyrillic;
//! point `PDF_FONT_PATH` at a CJK font to print Japanese or Chinese names.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use printpdf::path::PaintMode;
use printpdf::{
    Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Pt, Rect, Rgb,
};
use tracing::warn;
use ttf_parser::Face;

use crate::export::{format_duration, format_time_short};
use crate::store::ReportEntry;

/// The PDF lists at most this many records.
pub const MAX_ROWS: usize = 100;

const BUNDLED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BUNDLED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

// A4 in points
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const TOP_MARGIN: f32 = 20.0;
const BOTTOM_MARGIN: f32 = 20.0;

const HEADER_ROW_HEIGHT: f32 = 24.0;
const BODY_ROW_HEIGHT: f32 = 15.0;
const HEADER_FONT_SIZE: f32 = 10.0;
const BODY_FONT_SIZE: f32 = 8.0;
const CELL_PADDING: f32 = 2.0;

const COLUMNS: [(&str, f32); 6] = [
    ("User", 108.0),
    ("Username", 86.4),
    ("Date", 86.4),
    ("Clock in", 64.8),
    ("Clock out", 64.8),
    ("Work time", 72.0),
];

type Shade = (f32, f32, f32);

const BLUE: Shade = (0.0, 0.482, 1.0); // #007bff
const WHITESMOKE: Shade = (0.961, 0.961, 0.961);
const BEIGE: Shade = (0.961, 0.961, 0.863);
const BLACK: Shade = (0.0, 0.0, 0.0);

/// Font files used for the report, loaded once at startup.
pub struct ReportFonts {
    regular: Vec<u8>,
    bold: Vec<u8>,
}

impl ReportFonts {
    pub fn bundled() -> Self {
        Self {
            regular: BUNDLED_REGULAR.to_vec(),
            bold: BUNDLED_BOLD.to_vec(),
        }
    }

    /// Reads the configured font files, falling back to the bundled ones.
    pub fn load(regular: Option<&str>, bold: Option<&str>) -> Result<Self> {
        let fonts = Self {
            regular: read_font(regular, BUNDLED_REGULAR)?,
            bold: read_font(bold, BUNDLED_BOLD)?,
        };

        Face::parse(&fonts.regular, 0).context("regular PDF font is not a usable TrueType font")?;
        Face::parse(&fonts.bold, 0).context("bold PDF font is not a usable TrueType font")?;

        Ok(fonts)
    }
}

fn read_font(path: Option<&str>, bundled: &[u8]) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("failed to read font {path}")),
        None => Ok(bundled.to_vec()),
    }
}

fn mm(points: f32) -> Mm {
    Pt(points).into()
}

fn color((r, g, b): Shade) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// A font added to the document together with the metrics used to measure text.
struct Typeface<'a> {
    metrics: Face<'a>,
    font: IndirectFontRef,
}

impl<'a> Typeface<'a> {
    fn embed(doc: &PdfDocumentReference, data: &'a [u8]) -> Result<Self> {
        Ok(Self {
            metrics: Face::parse(data, 0).context("failed to parse PDF font")?,
            font: doc.add_external_font(data).context("failed to embed PDF font")?,
        })
    }

    /// Width in points. Characters without a glyph are not drawn and take no room.
    fn width(&self, text: &str, size: f32) -> f32 {
        let units_per_em = f32::from(self.metrics.units_per_em());
        let advance: u32 = text
            .chars()
            .filter_map(|c| self.metrics.glyph_index(c))
            .filter_map(|g| self.metrics.glyph_hor_advance(g))
            .map(u32::from)
            .sum();
        advance as f32 * size / units_per_em
    }

    /// Clips `text` with an ellipsis until it fits in `max_width`.
    fn fit(&self, text: &str, size: f32, max_width: f32) -> String {
        if self.width(text, size) <= max_width {
            return text.to_string();
        }

        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().chain(['…'].iter()).collect();
            if self.width(&candidate, size) <= max_width {
                return candidate;
            }
        }
        String::new()
    }

    fn missing_glyphs(&self, text: &str) -> Vec<char> {
        text.chars()
            .filter(|c| !c.is_whitespace() && self.metrics.glyph_index(*c).is_none())
            .collect()
    }
}

struct Sheet<'a> {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: Typeface<'a>,
    bold: Typeface<'a>,
}

impl Sheet<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Table");
        self.layer = self.doc.get_page(page).get_layer(layer);
    }

    fn text(&self, bold: bool, size: f32, x: f32, y: f32, shade: Shade, text: &str) {
        let face = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(color(shade));
        self.layer.use_text(text, size, mm(x), mm(y), &face.font);
    }

    fn cell(&self, x: f32, bottom: f32, width: f32, height: f32, fill: Shade) {
        self.layer.set_fill_color(color(fill));
        self.layer.set_outline_color(color(BLACK));
        self.layer.set_outline_thickness(1.0);
        self.layer.add_rect(
            Rect::new(mm(x), mm(bottom), mm(x + width), mm(bottom + height))
                .with_mode(PaintMode::FillStroke),
        );
    }

    fn row(&self, top: f32, cells: &[String], header: bool) {
        let (height, fill, ink, size, face) = if header {
            (HEADER_ROW_HEIGHT, BLUE, WHITESMOKE, HEADER_FONT_SIZE, &self.bold)
        } else {
            (BODY_ROW_HEIGHT, BEIGE, BLACK, BODY_FONT_SIZE, &self.regular)
        };

        let bottom = top - height;
        // header text sits higher to leave the extra bottom padding
        let baseline = if header {
            bottom + 12.0
        } else {
            bottom + (height - size) / 2.0 + 1.5
        };

        let mut x = table_left();
        for ((_, width), cell) in COLUMNS.iter().zip(cells) {
            self.cell(x, bottom, *width, height, fill);

            let text = face.fit(cell, size, width - 2.0 * CELL_PADDING);
            let offset = ((width - face.width(&text, size)) / 2.0).max(0.0);
            self.text(header, size, x + offset, baseline, ink, &text);

            x += width;
        }
    }
}

fn table_width() -> f32 {
    COLUMNS.iter().map(|(_, w)| w).sum()
}

fn table_left() -> f32 {
    (PAGE_WIDTH - table_width()) / 2.0
}

fn header_cells() -> Vec<String> {
    COLUMNS.iter().map(|(name, _)| name.to_string()).collect()
}

fn entry_cells(entry: &ReportEntry) -> Vec<String> {
    let record = &entry.record;
    vec![
        entry.full_name.clone(),
        entry.username.clone(),
        record.date().format("%Y-%m-%d").to_string(),
        format_time_short(record.clock_in_time()),
        format_time_short(record.clock_out_time()),
        format_duration(record.total_work_time()),
    ]
}

/// Lays the report out over as many A4 pages as needed and returns the PDF bytes.
pub fn render_report(
    fonts: &ReportFonts,
    entries: &[ReportEntry],
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>> {
    let title = "Attendance Report";
    let (doc, page, layer) = PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Table");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = Typeface::embed(&doc, &fonts.regular)?;
    let bold = Typeface::embed(&doc, &fonts.bold)?;
    let mut sheet = Sheet {
        doc,
        layer,
        regular,
        bold,
    };

    let entries = &entries[..entries.len().min(MAX_ROWS)];

    let missing: Vec<char> = entries
        .iter()
        .flat_map(|e| sheet.regular.missing_glyphs(&e.full_name))
        .collect();
    if !missing.is_empty() {
        warn!(
            count = missing.len(),
            sample = %missing.iter().take(8).collect::<String>(),
            "PDF font lacks glyphs for some names, set PDF_FONT_PATH to a font that covers them"
        );
    }

    let title_size = 20.0;
    let mut y = PAGE_HEIGHT - TOP_MARGIN - title_size;
    let title_x = (PAGE_WIDTH - sheet.bold.width(title, title_size)) / 2.0;
    sheet.text(true, title_size, title_x, y, BLUE, title);
    y -= 12.0 + 21.6;

    let info = format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    sheet.text(false, 10.0, table_left(), y, BLACK, &info);
    y -= 14.4 + 10.0;

    sheet.row(y, &header_cells(), true);
    y -= HEADER_ROW_HEIGHT;

    for entry in entries {
        if y - BODY_ROW_HEIGHT < BOTTOM_MARGIN {
            sheet.new_page();
            y = PAGE_HEIGHT - TOP_MARGIN;
            sheet.row(y, &header_cells(), true);
            y -= HEADER_ROW_HEIGHT;
        }
        sheet.row(y, &entry_cells(entry), false);
        y -= BODY_ROW_HEIGHT;
    }

    let Sheet { doc, .. } = sheet;
    doc.save_to_bytes().context("failed to write PDF report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;
    use chrono::{NaiveDate, NaiveTime};
    use printpdf::lopdf;

    fn entry(i: usize, full_name: &str) -> ReportEntry {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let t = |h| NaiveTime::from_hms_opt(h, 30, 0);
        ReportEntry {
            username: format!("user{:03}", i),
            full_name: full_name.to_string(),
            record: AttendanceRecord::restore(i as u64, date, t(9), t(17), None, None),
        }
    }

    fn entries(count: usize) -> Vec<ReportEntry> {
        (0..count).map(|i| entry(i, &format!("Person {}", i))).collect()
    }

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 6)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap()
    }

    /// Glyph ids of `text` as they appear in a `Tj` operand.
    fn encoded(font: &[u8], text: &str) -> Vec<u8> {
        let face = Face::parse(font, 0).unwrap();
        text.chars()
            .flat_map(|c| {
                let id = face.glyph_index(c).unwrap_or_else(|| panic!("no glyph for {c:?}")).0;
                id.to_be_bytes()
            })
            .collect()
    }

    struct Rendered {
        pages: usize,
        shown: Vec<Vec<u8>>,
    }

    impl Rendered {
        fn shows(&self, font: &[u8], text: &str) -> bool {
            self.shown.contains(&encoded(font, text))
        }
    }

    fn render(entries: &[ReportEntry]) -> Rendered {
        let bytes = render_report(&ReportFonts::bundled(), entries, generated()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        let mut shown = Vec::new();
        for page_id in pages.values() {
            let content = doc.get_and_decode_page_content(*page_id).unwrap();
            for op in content.operations.iter().filter(|op| op.operator == "Tj") {
                shown.push(op.operands[0].as_str().unwrap().to_vec());
            }
        }

        Rendered {
            pages: pages.len(),
            shown,
        }
    }

    #[test]
    fn document_structure() {
        let pdf = render(&entries(3));

        assert_eq!(pdf.pages, 1);
        assert!(pdf.shows(BUNDLED_BOLD, "Attendance Report"));
        assert!(pdf.shows(BUNDLED_BOLD, "Clock out"));
        assert!(pdf.shows(BUNDLED_REGULAR, "Generated: 2026-01-06 08:15:00"));
        assert!(pdf.shows(BUNDLED_REGULAR, "user002"));
        assert!(pdf.shows(BUNDLED_REGULAR, "09:30"));
        assert!(pdf.shows(BUNDLED_REGULAR, "8:00"));
    }

    #[test]
    fn caps_rows_and_paginates() {
        let pdf = render(&entries(150));

        assert!(pdf.pages > 1);
        assert!(pdf.shows(BUNDLED_REGULAR, "user099"));
        assert!(!pdf.shows(BUNDLED_REGULAR, "user100"));
    }

    #[test]
    fn names_keep_their_characters() {
        let pdf = render(&[entry(1, "Иван Петров"), entry(2, "Zoë Ångström")]);

        assert!(pdf.shows(BUNDLED_REGULAR, "Иван Петров"));
        assert!(pdf.shows(BUNDLED_REGULAR, "Zoë Ångström"));
    }

    #[test]
    fn reports_names_the_font_cannot_draw() {
        let doc = PdfDocument::empty("t");
        let face = Typeface::embed(&doc, BUNDLED_REGULAR).unwrap();

        assert_eq!(face.missing_glyphs("山田 太郎"), vec!['山', '田', '太', '郎']);
        assert!(face.missing_glyphs("Иван Петров").is_empty());
    }

    #[test]
    fn long_text_is_clipped_to_the_cell() {
        let doc = PdfDocument::empty("t");
        let face = Typeface::embed(&doc, BUNDLED_REGULAR).unwrap();

        let long = "Maximilian Alexander von Hohenberg-Schwarzenstein";
        let fitted = face.fit(long, BODY_FONT_SIZE, 100.0);
        assert!(fitted.ends_with('…'));
        assert!(face.width(&fitted, BODY_FONT_SIZE) <= 100.0);
        assert_eq!(face.fit("Ann", BODY_FONT_SIZE, 100.0), "Ann");
    }

    #[test]
    fn configured_fonts_must_exist() {
        assert!(ReportFonts::load(None, None).is_ok());
        assert!(ReportFonts::load(Some("/nonexistent/font.ttf"), None).is_err());
    }
}
