/// Number of items on every generated test.
pub const ITEMS_PER_TEST: usize = 40;

/// Rows per grid column; two columns hold the full test.
pub const ROWS_PER_COLUMN: usize = 20;

/// One word-list row as read from the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Row number used for range filtering. `None` rows are never selected.
    pub number: Option<i64>,
    pub question: String,
    pub answer: String,
}

impl Entry {
    pub fn new(number: Option<i64>, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            number,
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// One slot on the test sheet, after sampling and padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestItem {
    /// 1-based position on the sheet (1..=40)
    pub display_index: usize,
    /// Source row number, `None` for padding placeholders
    pub number: Option<i64>,
    pub question: String,
    pub answer: String,
}

impl TestItem {
    pub fn is_placeholder(&self) -> bool {
        self.number.is_none()
    }
}

/// Geometric constraint for placing one piece of text.
///
/// Widths and heights are in millimetres, font sizes in whole points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBudget {
    pub max_width: f32,
    pub max_height: f32,
    pub max_font_size: u32,
    pub min_font_size: u32,
    pub max_lines: usize,
    /// Leading characters kept when no font size fits
    pub truncate_chars: usize,
}

/// Font size and wrapped lines chosen by the fitter.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedBlock {
    pub font_size: u32,
    pub lines: Vec<String>,
    /// Gap between consecutive lines, in points
    pub line_gap: f32,
    /// Set when the degrade path produced a truncated single line
    pub truncated: bool,
}

impl FittedBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
