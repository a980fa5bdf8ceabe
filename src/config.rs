//! Layout configuration and the page geometry derived from it.
//!
//! All lengths are millimetres, font sizes are points. A `LayoutConfig` is
//! built once (defaults, optionally overridden from JSON) and turned into a
//! validated `PageGeometry` before any text is laid out.

use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::model::{FitBudget, ROWS_PER_COLUMN};

/// Tolerance for comparing accumulated millimetre sums
const EPSILON: f32 = 1e-3;

/// Tunable layout constants for the test sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Page size (A4 landscape by default)
    pub page_width: f32,
    pub page_height: f32,
    /// Uniform page margin
    pub margin: f32,
    /// Gap between the two grid columns
    pub column_gap: f32,

    /// Distance from the top edge to the title baseline
    pub title_offset: f32,
    /// Distance from the title baseline to the range label baseline
    pub range_label_gap: f32,
    /// Distance from the range label baseline to the top of the grid
    pub grid_gap: f32,

    pub title_font_size: f32,
    pub range_font_size: f32,
    pub blanks_font_size: f32,
    pub label_font_size: f32,

    /// Row height is clamped into this range
    pub min_row_height: f32,
    pub max_row_height: f32,

    /// Width of the "n." label at the start of each row
    pub label_width: f32,
    /// Question cell width as a fraction of the column width after the label
    pub question_fraction: f32,
    /// Space between question and answer, same base as `question_fraction`
    pub gap_fraction: f32,
    /// Answer cell width, same base as `question_fraction`
    pub answer_fraction: f32,
    /// Fraction of the row height available to a fitted cell
    pub cell_height_ratio: f32,

    pub max_font_size: u32,
    pub min_font_size: u32,
    pub max_lines: usize,
    /// Characters kept when a cell cannot be fitted at any size
    pub truncate_chars: usize,

    /// Thickness of the blank answer rule, in points
    pub rule_thickness: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 297.0,
            page_height: 210.0,
            margin: 15.0,
            column_gap: 15.0,
            title_offset: 15.0,
            range_label_gap: 8.0,
            grid_gap: 10.0,
            title_font_size: 16.0,
            range_font_size: 12.0,
            blanks_font_size: 11.0,
            label_font_size: 11.0,
            min_row_height: 7.0,
            max_row_height: 12.0,
            label_width: 10.0,
            question_fraction: 0.5,
            gap_fraction: 0.1,
            answer_fraction: 0.4,
            cell_height_ratio: 0.9,
            max_font_size: 11,
            min_font_size: 3,
            max_lines: 3,
            truncate_chars: 30,
            rule_thickness: 0.5,
        }
    }
}

impl LayoutConfig {
    /// Load a layout override file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::LayoutError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::LayoutError(format!("Invalid JSON: {}", e)))
    }

    /// Check the fitter preconditions and basic page sanity.
    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("min_row_height", self.min_row_height),
            ("question_fraction", self.question_fraction),
            ("answer_fraction", self.answer_fraction),
            ("cell_height_ratio", self.cell_height_ratio),
            ("title_font_size", self.title_font_size),
            ("range_font_size", self.range_font_size),
            ("blanks_font_size", self.blanks_font_size),
            ("label_font_size", self.label_font_size),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(invalid(format!("{} must be positive (got {})", name, value)));
            }
        }

        let non_negative = [
            ("margin", self.margin),
            ("column_gap", self.column_gap),
            ("label_width", self.label_width),
            ("gap_fraction", self.gap_fraction),
            ("rule_thickness", self.rule_thickness),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(format!("{} must not be negative (got {})", name, value)));
            }
        }

        if self.min_row_height > self.max_row_height {
            return Err(invalid(format!(
                "min_row_height {} exceeds max_row_height {}",
                self.min_row_height, self.max_row_height
            )));
        }
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            return Err(invalid(format!(
                "font size range {}..={} is empty",
                self.min_font_size, self.max_font_size
            )));
        }
        if self.max_lines == 0 {
            return Err(invalid("max_lines must be at least 1".to_string()));
        }
        if self.truncate_chars == 0 {
            return Err(invalid("truncate_chars must be at least 1".to_string()));
        }
        if self.cell_height_ratio > 1.0 {
            return Err(invalid(format!(
                "cell_height_ratio {} lets cells spill into neighbouring rows",
                self.cell_height_ratio
            )));
        }
        let fractions = self.question_fraction + self.gap_fraction + self.answer_fraction;
        if fractions > 1.0 + EPSILON {
            return Err(invalid(format!(
                "question, gap and answer fractions sum to {} (max 1.0)",
                fractions
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> AppError {
    AppError::LayoutError(message)
}

/// Absolute positions derived from a validated `LayoutConfig`.
///
/// Y coordinates grow upward from the bottom edge, as in PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub column_width: f32,
    /// Left edge of each grid column
    pub column_x: [f32; 2],
    pub title_y: f32,
    pub range_y: f32,
    /// Top edge of the first grid row
    pub grid_top: f32,
    pub row_height: f32,
    /// Question cell offset from the column's left edge
    pub question_offset: f32,
    pub question_width: f32,
    /// Answer cell offset from the column's left edge
    pub answer_offset: f32,
    pub answer_width: f32,
    pub question_budget: FitBudget,
    pub answer_budget: FitBudget,
}

impl PageGeometry {
    pub fn new(config: &LayoutConfig) -> Result<Self, AppError> {
        config.validate()?;

        let content_width = config.page_width - 2.0 * config.margin;
        let column_width = (content_width - config.column_gap) / 2.0;
        let cell_area = column_width - config.label_width;
        if cell_area <= 0.0 {
            return Err(invalid(format!(
                "columns are {:.1} mm wide, too narrow for the {:.1} mm label",
                column_width, config.label_width
            )));
        }

        let title_y = config.page_height - config.title_offset;
        let range_y = title_y - config.range_label_gap;
        let grid_top = range_y - config.grid_gap;
        let available = grid_top - config.margin;
        if available <= 0.0 {
            return Err(invalid(format!(
                "header leaves no room for the grid ({:.1} mm)",
                available
            )));
        }

        let row_height = (available / ROWS_PER_COLUMN as f32)
            .clamp(config.min_row_height, config.max_row_height);
        if row_height * ROWS_PER_COLUMN as f32 > available + EPSILON {
            return Err(invalid(format!(
                "{} rows of {:.1} mm do not fit in {:.1} mm below the header",
                ROWS_PER_COLUMN, row_height, available
            )));
        }

        let question_width = cell_area * config.question_fraction;
        let answer_width = cell_area * config.answer_fraction;
        let question_offset = config.label_width;
        let answer_offset = question_offset + question_width + cell_area * config.gap_fraction;
        let cell_height = row_height * config.cell_height_ratio;

        let budget = |max_width: f32| FitBudget {
            max_width,
            max_height: cell_height,
            max_font_size: config.max_font_size,
            min_font_size: config.min_font_size,
            max_lines: config.max_lines,
            truncate_chars: config.truncate_chars,
        };

        Ok(Self {
            page_width: config.page_width,
            page_height: config.page_height,
            margin: config.margin,
            column_width,
            column_x: [config.margin, config.margin + column_width + config.column_gap],
            title_y,
            range_y,
            grid_top,
            row_height,
            question_offset,
            question_width,
            answer_offset,
            answer_width,
            question_budget: budget(question_width),
            answer_budget: budget(answer_width),
        })
    }

    /// Top edge of grid row `row` (0-based)
    pub fn row_top(&self, row: usize) -> f32 {
        self.grid_top - row as f32 * self.row_height
    }
}
