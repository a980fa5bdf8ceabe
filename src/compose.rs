//! Page composition for the two-page test.
//!
//! Page 1 shows each question with a blank rule for the answer, page 2 shows
//! questions and answers. Both pages share the header and grid geometry, and
//! each question is fitted once so it lands on identical coordinates on both.

use crate::config::{LayoutConfig, PageGeometry};
use crate::document::{Document, DrawOp, FontWeight, Page, PageKind};
use crate::error::AppError;
use crate::fit::{block_height, fit_text};
use crate::metrics::{pt_to_mm, TextMetrics};
use crate::model::{FittedBlock, TestItem, ROWS_PER_COLUMN};

/// Helvetica cap height, as a fraction of the font size
const CAP_HEIGHT: f32 = 0.718;

/// Helvetica descender depth, as a fraction of the font size
const DESCENT: f32 = 0.207;

/// Distance of the blank answer rule below the label baseline
const RULE_DROP_MM: f32 = 1.0;

const NAME_BLANK: &str = "name: ________________";
const SCORE_BLANK: &str = "score: ________________";

/// Text printed above the grid on both pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub range_label: String,
}

impl Header {
    pub fn new(title: impl Into<String>, sheet: &str, start: i64, end: i64) -> Self {
        Self {
            title: title.into(),
            range_label: format!("words  {} ({}-{})", sheet, start, end),
        }
    }
}

/// Drawing state for one page, passed explicitly through the row helpers.
struct PageContext<'a> {
    kind: PageKind,
    geometry: &'a PageGeometry,
    ops: Vec<DrawOp>,
}

impl<'a> PageContext<'a> {
    fn new(kind: PageKind, geometry: &'a PageGeometry) -> Self {
        Self {
            kind,
            geometry,
            ops: Vec::new(),
        }
    }

    fn text(&mut self, text: &str, x: f32, y: f32, font_size: f32, weight: FontWeight) {
        self.ops.push(DrawOp::Text {
            x,
            y,
            font_size,
            weight,
            text: text.to_string(),
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
        });
    }

    /// Draw a fitted block vertically centred on `center_y`.
    fn block(&mut self, block: &FittedBlock, x: f32, center_y: f32) {
        if block.is_empty() {
            return;
        }
        let size = block.font_size as f32;
        let size_mm = pt_to_mm(size);
        let step = size_mm + pt_to_mm(block.line_gap);
        let top = center_y + block_height(block.lines.len(), block.font_size) / 2.0;

        for (k, line) in block.lines.iter().enumerate() {
            let baseline = top - k as f32 * step - size_mm + DESCENT * size_mm;
            self.text(line, x, baseline, size, FontWeight::Regular);
        }
    }

    fn finish(self) -> Page {
        Page {
            kind: self.kind,
            ops: self.ops,
        }
    }
}

/// Baseline that vertically centres single-line text on `center_y`
fn centred_baseline(center_y: f32, font_size: f32) -> f32 {
    center_y - pt_to_mm(font_size) * CAP_HEIGHT / 2.0
}

/// Questions and answers fitted to their cells.
struct FittedItem<'a> {
    item: &'a TestItem,
    question: FittedBlock,
    answer: FittedBlock,
}

/// Composes test documents with one fixed layout and font.
pub struct TestSheetComposer<'m> {
    config: LayoutConfig,
    geometry: PageGeometry,
    metrics: &'m dyn TextMetrics,
}

impl<'m> TestSheetComposer<'m> {
    /// Validates the layout; no text is laid out against a bad geometry.
    pub fn new(config: LayoutConfig, metrics: &'m dyn TextMetrics) -> Result<Self, AppError> {
        let geometry = PageGeometry::new(&config)?;
        log::debug!(
            "Grid: {} rows of {:.2} mm, columns {:.1} mm wide at x = {:?}",
            ROWS_PER_COLUMN,
            geometry.row_height,
            geometry.column_width,
            geometry.column_x
        );
        Ok(Self {
            config,
            geometry,
            metrics,
        })
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Lay out the question page and the answer page.
    pub fn compose(&self, items: &[TestItem], header: &Header) -> Document {
        let fitted: Vec<FittedItem> = items
            .iter()
            .map(|item| FittedItem {
                item,
                question: fit_text(&item.question, &self.geometry.question_budget, self.metrics),
                answer: fit_text(&item.answer, &self.geometry.answer_budget, self.metrics),
            })
            .collect();

        let degraded = fitted
            .iter()
            .filter(|f| f.question.truncated || f.answer.truncated)
            .count();
        if degraded > 0 {
            log::info!("{} item(s) were truncated to fit their cells", degraded);
        }

        let pages = [PageKind::Question, PageKind::Answer]
            .into_iter()
            .map(|kind| self.compose_page(kind, &fitted, header))
            .collect();

        Document {
            title: header.title.clone(),
            width: self.geometry.page_width,
            height: self.geometry.page_height,
            pages,
        }
    }

    fn compose_page(&self, kind: PageKind, fitted: &[FittedItem], header: &Header) -> Page {
        let mut ctx = PageContext::new(kind, &self.geometry);
        self.draw_header(&mut ctx, header);

        for (column, base_x) in self.geometry.column_x.into_iter().enumerate() {
            let first = column * ROWS_PER_COLUMN;
            for row in 0..ROWS_PER_COLUMN {
                let Some(entry) = fitted.get(first + row) else {
                    break;
                };
                self.draw_row(&mut ctx, entry, base_x, row);
            }
        }

        ctx.finish()
    }

    fn draw_header(&self, ctx: &mut PageContext, header: &Header) {
        let config = &self.config;
        let geometry = ctx.geometry;
        let left_x = geometry.margin;
        let right_edge = geometry.page_width - geometry.margin;
        let blank_x =
            |text: &str| right_edge - self.metrics.text_width(text, config.blanks_font_size);

        ctx.text(
            &header.title,
            left_x,
            geometry.title_y,
            config.title_font_size,
            FontWeight::Bold,
        );
        ctx.text(
            &header.range_label,
            left_x,
            geometry.range_y,
            config.range_font_size,
            FontWeight::Regular,
        );
        ctx.text(
            NAME_BLANK,
            blank_x(NAME_BLANK),
            geometry.title_y,
            config.blanks_font_size,
            FontWeight::Regular,
        );
        ctx.text(
            SCORE_BLANK,
            blank_x(SCORE_BLANK),
            geometry.range_y,
            config.blanks_font_size,
            FontWeight::Regular,
        );
    }

    fn draw_row(&self, ctx: &mut PageContext, fitted: &FittedItem, base_x: f32, row: usize) {
        let geometry = ctx.geometry;
        let center_y = geometry.row_top(row) - geometry.row_height / 2.0;
        let label_y = centred_baseline(center_y, self.config.label_font_size);

        ctx.text(
            &format!("{}.", fitted.item.display_index),
            base_x,
            label_y,
            self.config.label_font_size,
            FontWeight::Regular,
        );

        ctx.block(&fitted.question, base_x + geometry.question_offset, center_y);

        let answer_x = base_x + geometry.answer_offset;
        let kind = ctx.kind;
        match kind {
            PageKind::Question => {
                let rule_y = label_y - RULE_DROP_MM;
                ctx.line(
                    answer_x,
                    rule_y,
                    answer_x + geometry.answer_width,
                    rule_y,
                    self.config.rule_thickness,
                );
            }
            PageKind::Answer => ctx.block(&fitted.answer, answer_x, center_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::HelveticaMetrics;
    use crate::model::{Entry, ITEMS_PER_TEST};
    use crate::select::select_items;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ten_item_test() -> Vec<TestItem> {
        let entries: Vec<Entry> = (1..=10)
            .map(|n| Entry::new(Some(n), format!("word {}", n), format!("answer {}", n)))
            .collect();
        select_items(&entries, 1, 10, &mut StdRng::seed_from_u64(5))
    }

    fn compose(items: &[TestItem]) -> Document {
        let composer = TestSheetComposer::new(LayoutConfig::default(), &HelveticaMetrics).unwrap();
        composer.compose(items, &Header::new("Vocabulary test", "Unit 1", 1, 10))
    }

    fn text_position(page: &Page, wanted: &str) -> Option<(f32, f32)> {
        page.ops.iter().find_map(|op| match op {
            DrawOp::Text { x, y, text, .. } if text == wanted => Some((*x, *y)),
            _ => None,
        })
    }

    fn lines(page: &Page) -> usize {
        page.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count()
    }

    #[test]
    fn produces_question_then_answer_page() {
        let doc = compose(&ten_item_test());
        let kinds: Vec<PageKind> = doc.pages.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PageKind::Question, PageKind::Answer]);
        assert_eq!(doc.width, 297.0);
        assert_eq!(doc.height, 210.0);
    }

    #[test]
    fn labels_fill_left_then_right_column() {
        let doc = compose(&ten_item_test());
        let composer = TestSheetComposer::new(LayoutConfig::default(), &HelveticaMetrics).unwrap();
        let [left, right] = composer.geometry().column_x;

        for page in &doc.pages {
            for n in 1..=ITEMS_PER_TEST {
                let (x, _) = text_position(page, &format!("{}.", n)).unwrap();
                let expected = if n <= ROWS_PER_COLUMN { left } else { right };
                assert_eq!(x, expected, "label {} on {:?}", n, page.kind);
            }
            let (_, y1) = text_position(page, "1.").unwrap();
            let (_, y21) = text_position(page, "21.").unwrap();
            assert_eq!(y1, y21);
        }
    }

    #[test]
    fn question_and_labels_match_across_pages() {
        let items = ten_item_test();
        let doc = compose(&items);
        let (questions, answers) = (&doc.pages[0], &doc.pages[1]);

        for item in &items {
            let label = format!("{}.", item.display_index);
            assert_eq!(text_position(questions, &label), text_position(answers, &label));
            if !item.question.is_empty() {
                assert_eq!(
                    text_position(questions, &item.question),
                    text_position(answers, &item.question)
                );
            }
        }
    }

    #[test]
    fn header_is_identical_on_both_pages() {
        let doc = compose(&ten_item_test());
        let header = |page: &Page| page.ops[..4].to_vec();
        assert_eq!(header(&doc.pages[0]), header(&doc.pages[1]));
        assert!(text_position(&doc.pages[0], "words  Unit 1 (1-10)").is_some());
    }

    #[test]
    fn blanks_end_at_the_right_margin() {
        let doc = compose(&ten_item_test());
        for blank in [NAME_BLANK, SCORE_BLANK] {
            let (x, _) = text_position(&doc.pages[0], blank).unwrap();
            let right = x + HelveticaMetrics.text_width(blank, 11.0);
            assert!((right - (297.0 - 15.0)).abs() < 1e-3);
        }
    }

    #[test]
    fn only_the_answer_region_differs() {
        let items = ten_item_test();
        let doc = compose(&items);
        let (questions, answers) = (&doc.pages[0], &doc.pages[1]);

        assert_eq!(lines(questions), ITEMS_PER_TEST);
        assert_eq!(lines(answers), 0);
        for item in items.iter().filter(|i| !i.is_placeholder()) {
            assert!(questions.texts().all(|t| t != item.answer));
            assert!(answers.texts().any(|t| t == item.answer));
        }
    }

    #[test]
    fn rows_stay_inside_the_page_margins() {
        let doc = compose(&ten_item_test());
        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::Text { x, y, .. } = op {
                    assert!(*x >= 15.0 && *x < 297.0 - 15.0);
                    assert!(*y >= 15.0 && *y <= 210.0 - 15.0);
                }
            }
        }
    }

    #[test]
    fn long_text_stays_within_its_row() {
        let mut items = ten_item_test();
        items[0].question = "an extraordinarily long question that will need to wrap across several lines to fit".into();
        items[0].answer = "x".repeat(400);
        let doc = compose(&items);

        let composer = TestSheetComposer::new(LayoutConfig::default(), &HelveticaMetrics).unwrap();
        let geometry = composer.geometry();
        let (row_top, row_bottom) = (geometry.row_top(0), geometry.row_top(1));

        for page in &doc.pages {
            for op in &page.ops {
                if let DrawOp::Text { x, y, text, .. } = op {
                    let in_first_cell = *x > geometry.column_x[0] + 1.0 && *x < geometry.column_x[1];
                    if in_first_cell && *y > row_bottom - 1.0 && text != "1." {
                        assert!(*y < row_top, "{:?} at {} is above row top {}", text, y, row_top);
                        assert!(*y > row_bottom, "{:?} at {} is below row bottom {}", text, y, row_bottom);
                    }
                }
            }
        }
        assert!(doc.pages[1].texts().any(|t| t.ends_with(crate::fit::ELLIPSIS)));
    }
}
