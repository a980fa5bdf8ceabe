//! Standalone HTML rendering: one inline SVG per page with an annotation
//! canvas stacked on top of it.

use crate::document::{Document, DrawOp, FontWeight, Page, PageKind};
use crate::metrics::pt_to_mm;

const STYLE: &str = "
body { margin: 0; padding: 16px; background: #ddd; font-family: sans-serif; }
.sheet { position: relative; margin: 0 auto 16px; max-width: 1100px; background: #fff;
         box-shadow: 0 1px 4px rgba(0, 0, 0, 0.3); }
.sheet svg { display: block; width: 100%; height: auto; }
.sheet canvas.ink { position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; }
@media print { body { padding: 0; background: none; } .sheet { box-shadow: none; page-break-after: always; } }
";

/// Render `document` as an HTML page. `font_family` names the face used for
/// measuring so the browser can pick the same one when installed.
pub fn render_html(document: &Document, font_family: &str) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str(&format!("<title>{}</title>\n", escape(&document.title)));
    out.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", STYLE));

    for (index, page) in document.pages.iter().enumerate() {
        render_page(&mut out, document, page, index + 1, font_family);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_page(out: &mut String, document: &Document, page: &Page, number: usize, font_family: &str) {
    let kind = match page.kind {
        PageKind::Question => "question",
        PageKind::Answer => "answer",
    };
    let (w, h) = (document.width, document.height);

    out.push_str(&format!(
        "<section class=\"sheet {}\" data-page=\"{}\">\n",
        kind, number
    ));
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\" font-family=\"{}, Helvetica, Arial, sans-serif\">\n",
        num(w),
        num(h),
        escape(font_family)
    ));

    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font_size,
                weight,
                text,
            } => {
                let weight = match weight {
                    FontWeight::Regular => "",
                    FontWeight::Bold => " font-weight=\"bold\"",
                };
                out.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-size=\"{}\"{} xml:space=\"preserve\">{}</text>\n",
                    num(*x),
                    num(h - *y),
                    num(pt_to_mm(*font_size)),
                    weight,
                    escape(text)
                ));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                thickness,
            } => {
                out.push_str(&format!(
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#000\" stroke-width=\"{}\"/>\n",
                    num(*x1),
                    num(h - *y1),
                    num(*x2),
                    num(h - *y2),
                    num(pt_to_mm(*thickness))
                ));
            }
        }
    }

    out.push_str("</svg>\n");
    out.push_str(&format!(
        "<canvas class=\"ink\" data-page=\"{}\" data-width-mm=\"{}\" data-height-mm=\"{}\"></canvas>\n",
        number,
        num(w),
        num(h)
    ));
    out.push_str("</section>\n");
}

/// Millimetre value with two decimals and no trailing zeros
fn num(value: f32) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document {
            title: "Q & A".to_string(),
            width: 297.0,
            height: 210.0,
            pages: vec![
                Page {
                    kind: PageKind::Question,
                    ops: vec![DrawOp::Line {
                        x1: 10.0,
                        y1: 10.0,
                        x2: 50.0,
                        y2: 10.0,
                        thickness: 0.5,
                    }],
                },
                Page {
                    kind: PageKind::Answer,
                    ops: vec![DrawOp::Text {
                        x: 15.0,
                        y: 195.0,
                        font_size: 16.0,
                        weight: FontWeight::Bold,
                        text: "<b>apple</b>".to_string(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn one_section_and_canvas_per_page() {
        let html = render_html(&document(), "Helvetica");
        assert_eq!(html.matches("<section").count(), 2);
        assert_eq!(html.matches("<canvas class=\"ink\"").count(), 2);
        assert!(html.contains("class=\"sheet question\" data-page=\"1\""));
        assert!(html.contains("class=\"sheet answer\" data-page=\"2\""));
    }

    #[test]
    fn flips_y_axis_for_svg() {
        let html = render_html(&document(), "Helvetica");
        assert!(html.contains("<text x=\"15\" y=\"15\""));
        assert!(html.contains("<line x1=\"10\" y1=\"200\" x2=\"50\" y2=\"200\""));
    }

    #[test]
    fn escapes_markup_in_text() {
        let html = render_html(&document(), "Helvetica");
        assert!(html.contains("<title>Q &amp; A</title>"));
        assert!(html.contains("&lt;b&gt;apple&lt;/b&gt;"));
        assert!(!html.contains("<b>apple"));
    }

    #[test]
    fn formats_numbers_compactly() {
        assert_eq!(num(15.0), "15");
        assert_eq!(num(8.10), "8.1");
        assert_eq!(num(1.23456), "1.23");
        assert_eq!(num(-0.001), "0");
    }
}
