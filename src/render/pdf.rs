use std::io::{BufWriter, Cursor};

use printpdf::*;

use crate::document::{Document, DrawOp, FontWeight, Page};
use crate::error::AppError;
use crate::metrics::FontSource;

/// Regular and bold font handles registered with one PDF document
struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference, source: &FontSource) -> Result<Self, AppError> {
        match source {
            FontSource::Builtin => {
                let regular = doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| AppError::PdfError(e.to_string()))?;
                let bold = doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(|e| AppError::PdfError(e.to_string()))?;
                Ok(Self { regular, bold })
            }
            FontSource::TrueType { path, data } => {
                // one face serves both weights
                let regular = doc
                    .add_external_font(Cursor::new(data.as_slice()))
                    .map_err(|e| AppError::FontError(format!("{}: {}", path.display(), e)))?;
                Ok(Self {
                    bold: regular.clone(),
                    regular,
                })
            }
        }
    }

    fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Render every page of `document` into PDF bytes.
pub fn render_pdf(document: &Document, font: &FontSource) -> Result<Vec<u8>, AppError> {
    if matches!(font, FontSource::Builtin) && has_non_latin_text(document) {
        log::warn!("Text outside Latin-1 will not display with the built-in font; pass --font");
    }

    let (doc, page1, layer1) = PdfDocument::new(
        document.title.as_str(),
        Mm(document.width),
        Mm(document.height),
        "Layer 1",
    );
    let fonts = Fonts::load(&doc, font)?;

    for (index, page) in document.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (new_page, new_layer) = doc.add_page(
                Mm(document.width),
                Mm(document.height),
                format!("Page {}", index + 1),
            );
            doc.get_page(new_page).get_layer(new_layer)
        };
        draw_page(&layer, &fonts, page);
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| AppError::PdfError(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| AppError::PdfError(e.to_string()))
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, page: &Page) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font_size,
                weight,
                text,
            } => {
                layer.use_text(text.as_str(), *font_size, Mm(*x), Mm(*y), fonts.get(*weight));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                thickness,
            } => {
                layer.set_outline_thickness(*thickness);
                draw_line(layer, *x1, *y1, *x2, *y2);
            }
        }
    }
}

fn draw_line(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    let points = vec![
        (Point::new(Mm(x1), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y2)), false),
    ];
    let line = Line {
        points,
        is_closed: false,
    };
    layer.add_line(line);
}

fn has_non_latin_text(document: &Document) -> bool {
    document
        .pages
        .iter()
        .flat_map(Page::texts)
        .any(|text| text.chars().any(|c| u32::from(c) > 0xFF))
}
