use std::io::BufWriter;
use std::ops::Range;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::{format_money, format_percent, InvoiceDocument, RenderError};
use crate::features::billing::words::amount_in_words;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MM: f32 = 280.0;
const ROW_MM: f32 = 7.0;
const LEFT_MM: f32 = 15.0;
const DESCRIPTION_CHARS: usize = 48;

/// Row budget of an A4 page, in table-row units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    /// Item rows that fit on a page without header or totals
    pub rows_per_page: usize,
    /// Rows taken by the letterhead on the first page
    pub header_rows: usize,
    /// Rows taken by the totals block on the last page
    pub totals_rows: usize,
}

pub const INVOICE_LAYOUT: PageLayout = PageLayout {
    rows_per_page: 36,
    header_rows: 7,
    totals_rows: 8,
};

/// Split `rows` item rows into per-page ranges.
///
/// The first page loses `header_rows`; the totals block must fit on the last
/// page, so a full final page pushes the totals onto a page of their own.
pub fn slice_pages(rows: usize, layout: &PageLayout) -> Vec<Range<usize>> {
    let first_capacity = layout.rows_per_page.saturating_sub(layout.header_rows).max(1);
    let capacity = layout.rows_per_page.max(layout.totals_rows + 1);

    let mut pages = Vec::new();
    let mut start = 0;
    loop {
        let page_capacity = if pages.is_empty() {
            first_capacity
        } else {
            capacity
        };
        let remaining = rows - start;
        if remaining + layout.totals_rows <= page_capacity {
            pages.push(start..rows);
            return pages;
        }
        let take = remaining.min(page_capacity);
        pages.push(start..start + take);
        start += take;
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max - 1).collect();
        cut.push('~');
        cut
    }
}

/// Text the builtin Helvetica fonts can show.
///
/// Builtin PDF fonts only cover a single-byte encoding, so common typography
/// and the rupee sign are spelled out and any other non-ASCII character
/// becomes `?` instead of garbage glyphs.
pub fn pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\u{20B9}' => out.push_str("Rs."),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\t' | '\n' | '\r' => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

fn put_text(
    layer: &PdfLayerReference,
    text: impl AsRef<str>,
    size: f32,
    x: Mm,
    y: Mm,
    font: &IndirectFontRef,
) {
    layer.use_text(pdf_text(text.as_ref()), size, x, y, font);
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Cursor {
    y: f32,
}

impl Cursor {
    fn next(&mut self) -> Mm {
        let y = Mm(self.y);
        self.y -= ROW_MM;
        y
    }
}

fn draw_header(layer: &PdfLayerReference, doc: &InvoiceDocument, fonts: &Fonts, cursor: &mut Cursor) {
    let invoice = &doc.invoice;
    put_text(layer, &doc.organization_name, 16.0, Mm(LEFT_MM), cursor.next(), &fonts.bold);

    let clinic = match &doc.clinic_phone {
        Some(phone) => format!("{} | Phone: {}", doc.clinic_name, phone),
        None => doc.clinic_name.clone(),
    };
    put_text(layer, clinic, 10.0, Mm(LEFT_MM), cursor.next(), &fonts.regular);
    put_text(
        layer,
        doc.clinic_address.clone().unwrap_or_default(),
        10.0,
        Mm(LEFT_MM),
        cursor.next(),
        &fonts.regular,
    );
    cursor.next();

    put_text(
        layer,
        format!(
            "Invoice {}    Date: {}    Due: {}",
            invoice.invoice_number,
            invoice.issue_date.format("%d %b %Y"),
            invoice.due_date.format("%d %b %Y")
        ),
        11.0,
        Mm(LEFT_MM),
        cursor.next(),
        &fonts.bold,
    );
    let patient = match &doc.patient_phone {
        Some(phone) => format!("Bill to: {} ({})", doc.patient_name, phone),
        None => format!("Bill to: {}", doc.patient_name),
    };
    put_text(layer, patient, 10.0, Mm(LEFT_MM), cursor.next(), &fonts.regular);
    cursor.next();
}

const COLUMNS: [(&str, f32); 7] = [
    ("#", 0.0),
    ("Description", 8.0),
    ("Qty", 95.0),
    ("Unit Price", 108.0),
    ("Disc %", 133.0),
    ("Tax %", 148.0),
    ("Amount", 162.0),
];

fn draw_row(layer: &PdfLayerReference, cells: [String; 7], y: Mm, font: &IndirectFontRef) {
    for ((_, offset), text) in COLUMNS.iter().zip(cells) {
        put_text(layer, text, 9.0, Mm(LEFT_MM + offset), y, font);
    }
}

fn draw_totals(layer: &PdfLayerReference, doc: &InvoiceDocument, fonts: &Fonts, cursor: &mut Cursor) {
    let invoice = &doc.invoice;
    cursor.next();

    let rows = [
        ("Subtotal", format_money(invoice.subtotal)),
        ("Discount", format!("-{}", format_money(invoice.discount_total))),
        ("Tax", format_money(invoice.tax_total)),
        (
            "Total",
            format!("{} {}", doc.currency, format_money(invoice.total_amount)),
        ),
        ("Amount Paid", format_money(invoice.amount_paid)),
        ("Balance Due", format_money(invoice.balance_due())),
    ];
    for (label, value) in rows {
        let y = cursor.next();
        let font = if label == "Total" { &fonts.bold } else { &fonts.regular };
        put_text(layer, label, 10.0, Mm(LEFT_MM + 133.0), y, font);
        put_text(layer, value, 10.0, Mm(LEFT_MM + 162.0), y, font);
    }

    put_text(
        layer,
        amount_in_words(invoice.total_amount),
        9.0,
        Mm(LEFT_MM),
        cursor.next(),
        &fonts.bold,
    );
}

/// Render the invoice as an A4 PDF, paginating the item table
pub fn invoice_pdf(doc: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
    let title = format!("Invoice {}", doc.invoice.invoice_number);
    let (pdf, first_page, first_layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

    let fonts = Fonts {
        regular: pdf
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(format!("font error: {e}")))?,
        bold: pdf
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(format!("font error: {e}")))?,
    };

    let pages = slice_pages(doc.items.len(), &INVOICE_LAYOUT);
    let page_count = pages.len();

    for (index, rows) in pages.into_iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = pdf.get_page(page).get_layer(layer);
        let mut cursor = Cursor { y: TOP_MM };

        if index == 0 {
            draw_header(&layer, doc, &fonts, &mut cursor);
        }

        draw_row(
            &layer,
            COLUMNS.map(|(title, _)| title.to_string()),
            cursor.next(),
            &fonts.bold,
        );
        for position in rows {
            let item = &doc.items[position];
            draw_row(
                &layer,
                [
                    (position + 1).to_string(),
                    truncate(&item.description, DESCRIPTION_CHARS),
                    format_percent(item.quantity),
                    format_money(item.unit_price),
                    format_percent(item.discount_percent),
                    format_percent(item.tax_percent),
                    format_money(item.amount),
                ],
                cursor.next(),
                &fonts.regular,
            );
        }

        if index + 1 == page_count {
            draw_totals(&layer, doc, &fonts, &mut cursor);
        }

        put_text(
            &layer,
            format!("Page {} of {}", index + 1, page_count),
            8.0,
            Mm(PAGE_WIDTH_MM - 40.0),
            Mm(10.0),
            &fonts.regular,
        );
    }

    let mut buf = BufWriter::new(Vec::new());
    pdf.save(&mut buf)
        .map_err(|e| RenderError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| RenderError::Pdf(format!("buffer error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::billing::render::fixtures::{document, item};

    const LAYOUT: PageLayout = PageLayout {
        rows_per_page: 10,
        header_rows: 4,
        totals_rows: 3,
    };

    #[test]
    fn test_everything_fits_on_one_page() {
        assert_eq!(slice_pages(0, &LAYOUT), vec![0..0]);
        assert_eq!(slice_pages(3, &LAYOUT), vec![0..3]);
    }

    #[test]
    fn test_totals_overflow_to_own_page() {
        // First page holds 6 rows; 5 rows plus 3 totals rows do not fit.
        assert_eq!(slice_pages(5, &LAYOUT), vec![0..5, 5..5]);
        assert_eq!(slice_pages(6, &LAYOUT), vec![0..6, 6..6]);
    }

    #[test]
    fn test_rows_continue_on_following_pages() {
        assert_eq!(slice_pages(13, &LAYOUT), vec![0..6, 6..13]);
        assert_eq!(slice_pages(20, &LAYOUT), vec![0..6, 6..16, 16..20]);
    }

    #[test]
    fn test_every_row_lands_on_exactly_one_page() {
        for rows in 0..120 {
            let pages = slice_pages(rows, &INVOICE_LAYOUT);
            let covered: usize = pages.iter().map(|r| r.len()).sum();
            assert_eq!(covered, rows);
            assert_eq!(pages.last().map(|r| r.end), Some(rows));
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Crown", 10), "Crown");
        assert_eq!(truncate("Zirconia crown", 8), "Zirconi~");
    }

    #[test]
    fn test_pdf_text_stays_in_builtin_font_range() {
        assert_eq!(pdf_text("Dr. Rao's Clinic"), "Dr. Rao's Clinic");
        assert_eq!(pdf_text("\u{20B9} 1,500"), "Rs. 1,500");
        assert_eq!(pdf_text("Scaling \u{2013} full mouth"), "Scaling - full mouth");
        assert_eq!(pdf_text("\u{0930}\u{093E}\u{092E}"), "???");
        assert!(pdf_text("Ren\u{00E9}e \u{201C}RCT\u{201D}").is_ascii());
    }

    #[test]
    fn test_pdf_with_non_latin_names() {
        let mut doc = document(vec![item(0, "\u{0926}\u{093E}\u{0902}\u{0924} filling", 1500)]);
        doc.patient_name = "\u{0930}\u{093E}\u{092E} \u{0936}\u{0930}\u{094D}\u{092E}\u{093E}".to_string();
        let bytes = invoice_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_bytes() {
        let items = (0..45).map(|i| item(i, "Composite filling", 1500)).collect();
        let bytes = invoice_pdf(&document(items)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
