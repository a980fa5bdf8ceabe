//! Fitting text into a fixed cell.
//!
//! The fitter scans font sizes from largest to smallest and greedily wraps the
//! text at each size; the first size whose wrapped block fits both the line
//! limit and the cell height wins. When nothing fits, the text is cut to a few
//! leading characters on a single line at the smallest size.
//!
//! Callers must hand in a sane budget (positive width and height, non-empty
//! font size range, at least one line). `PageGeometry::new` checks this once
//! per document.

use crate::metrics::{pt_to_mm, TextMetrics};
use crate::model::{FitBudget, FittedBlock};

/// Line gap as a fraction of the font size
const LINE_GAP_RATIO: f32 = 0.25;

/// Smallest line gap, in points
const MIN_LINE_GAP: f32 = 1.0;

/// Appended to text cut short by the degrade path
pub const ELLIPSIS: &str = "...";

/// Gap between wrapped lines at `font_size`, in points.
pub fn line_gap(font_size: u32) -> f32 {
    (font_size as f32 * LINE_GAP_RATIO).max(MIN_LINE_GAP)
}

/// Height of a block of `lines` lines, in millimetres.
pub fn block_height(lines: usize, font_size: u32) -> f32 {
    if lines == 0 {
        return 0.0;
    }
    let size = font_size as f32;
    pt_to_mm(lines as f32 * size + (lines - 1) as f32 * line_gap(font_size))
}

/// Choose the largest font size and wrap that keeps `text` inside `budget`.
pub fn fit_text(text: &str, budget: &FitBudget, metrics: &dyn TextMetrics) -> FittedBlock {
    let text = text.trim();
    if text.is_empty() {
        return FittedBlock {
            font_size: budget.max_font_size,
            lines: Vec::new(),
            line_gap: line_gap(budget.max_font_size),
            truncated: false,
        };
    }

    for font_size in (budget.min_font_size..=budget.max_font_size).rev() {
        let Some(lines) = wrap(text, font_size as f32, budget.max_width, budget.max_lines, metrics)
        else {
            continue;
        };
        if block_height(lines.len(), font_size) <= budget.max_height {
            return FittedBlock {
                font_size,
                lines,
                line_gap: line_gap(font_size),
                truncated: false,
            };
        }
    }

    log::debug!(
        "No size in {}..={} fits {:?}; truncating to {} chars",
        budget.min_font_size,
        budget.max_font_size,
        text,
        budget.truncate_chars
    );
    degrade(text, budget, metrics)
}

/// One line of at most `truncate_chars` leading characters plus the ellipsis,
/// shortened further until it fits the cell width at the smallest size.
fn degrade(text: &str, budget: &FitBudget, metrics: &dyn TextMetrics) -> FittedBlock {
    let size = budget.min_font_size as f32;
    let normalised = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut kept: Vec<char> = normalised.chars().take(budget.truncate_chars).collect();

    let line = loop {
        let candidate = format!("{}{}", kept.iter().collect::<String>().trim_end(), ELLIPSIS);
        if metrics.text_width(&candidate, size) <= budget.max_width {
            break candidate;
        }
        if kept.pop().is_none() {
            // not even the marker fits
            break String::new();
        }
    };

    FittedBlock {
        font_size: budget.min_font_size,
        lines: vec![line],
        line_gap: line_gap(budget.min_font_size),
        truncated: true,
    }
}

/// Greedy line wrap at one font size.
///
/// Text containing whitespace wraps between words; text without whitespace
/// (e.g. Japanese) wraps between characters. A word wider than the cell is
/// broken between its characters. Returns `None` once more than `max_lines`
/// lines are certain, or when a single character is wider than the cell.
fn wrap(
    text: &str,
    font_size: f32,
    max_width: f32,
    max_lines: usize,
    metrics: &dyn TextMetrics,
) -> Option<Vec<String>> {
    let spaced = text.contains(char::is_whitespace);
    let mut builder = LineBuilder {
        lines: Vec::new(),
        current: String::new(),
        font_size,
        max_width,
        max_lines,
        metrics,
    };

    if spaced {
        for word in text.split_whitespace() {
            if builder.push(word, " ")? {
                continue;
            }
            // the word is wider than a whole line on its own
            for ch in word.chars() {
                let mut buf = [0u8; 4];
                if !builder.push(ch.encode_utf8(&mut buf), "")? {
                    return None;
                }
            }
        }
    } else {
        for ch in text.chars() {
            let mut buf = [0u8; 4];
            if !builder.push(ch.encode_utf8(&mut buf), "")? {
                return None;
            }
        }
    }

    builder.finish()
}

struct LineBuilder<'a> {
    lines: Vec<String>,
    current: String,
    font_size: f32,
    max_width: f32,
    max_lines: usize,
    metrics: &'a dyn TextMetrics,
}

impl LineBuilder<'_> {
    fn fits(&self, candidate: &str) -> bool {
        self.metrics.text_width(candidate, self.font_size) <= self.max_width
    }

    /// Append `piece` to the running line, or start a new line with it.
    ///
    /// `Some(false)` means `piece` is wider than an empty line; `None` means
    /// the line limit has been exceeded.
    fn push(&mut self, piece: &str, separator: &str) -> Option<bool> {
        if self.current.is_empty() {
            if !self.fits(piece) {
                return Some(false);
            }
            self.current.push_str(piece);
            return Some(true);
        }

        let candidate = format!("{}{}{}", self.current, separator, piece);
        if self.fits(&candidate) {
            self.current = candidate;
            return Some(true);
        }

        if !self.fits(piece) {
            // close the running line so the piece can be split from a fresh one
            self.close_line()?;
            return Some(false);
        }

        self.close_line()?;
        self.current.push_str(piece);
        Some(true)
    }

    fn close_line(&mut self) -> Option<()> {
        self.lines.push(std::mem::take(&mut self.current));
        // the text continues, so at least one more line will follow
        if self.lines.len() >= self.max_lines {
            return None;
        }
        Some(())
    }

    fn finish(mut self) -> Option<Vec<String>> {
        if !self.current.is_empty() {
            self.lines.push(self.current);
        }
        if self.lines.len() > self.max_lines {
            return None;
        }
        Some(self.lines)
    }
}
