//! Text measurement for the fitter.
//!
//! Widths are returned in millimetres so they can be compared directly with
//! the page geometry; font sizes are in points.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Points to millimetres
pub const PT_TO_MM: f32 = 25.4 / 72.0;

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * PT_TO_MM
}

/// Width of a string rendered in one font.
///
/// Implementations must be monotonic non-decreasing in `font_size` for a
/// fixed string.
pub trait TextMetrics: Send + Sync {
    /// Rendered width of `text` at `font_size` points, in millimetres
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

// ============================================================================
// Built-in Helvetica
// ============================================================================

/// Helvetica advance widths for ASCII 0x20..=0x7E, in 1/1000 em (AFM)
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :;<=>?@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [\]^_`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {|}~
];

/// Fallback for characters outside the table
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// Full-width glyphs (CJK and friends) occupy one em
const FULL_WIDTH: u16 = 1000;

/// Metrics of the PDF base-14 Helvetica font.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    fn char_width(ch: char) -> u16 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            HELVETICA_WIDTHS
                .get((code - 0x20) as usize)
                .copied()
                .unwrap_or(HELVETICA_DEFAULT_WIDTH)
        } else if is_full_width(ch) {
            FULL_WIDTH
        } else {
            HELVETICA_DEFAULT_WIDTH
        }
    }
}

impl TextMetrics for HelveticaMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(Self::char_width(c))).sum();
        pt_to_mm(units as f32 * font_size / 1000.0)
    }
}

/// East Asian wide and fullwidth ranges
fn is_full_width(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

// ============================================================================
// TrueType fonts
// ============================================================================

/// Advance widths read from a TrueType/OpenType font's cmap and hmtx tables.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    advances: HashMap<char, u16>,
    default_advance: u16,
    units_per_em: f32,
}

impl TrueTypeMetrics {
    pub fn from_bytes(data: &[u8]) -> Result<Self, AppError> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| AppError::FontError(format!("Failed to parse font: {}", e)))?;

        let mut advances = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let glyph = subtable.glyph_index(code);
                    if let (Some(ch), Some(glyph)) = (char::from_u32(code), glyph) {
                        if let Some(advance) = face.glyph_hor_advance(glyph) {
                            advances.entry(ch).or_insert(advance);
                        }
                    }
                });
            }
        }

        if advances.is_empty() {
            return Err(AppError::FontError(
                "font has no Unicode character map".to_string(),
            ));
        }

        let units_per_em = face.units_per_em();
        let default_advance = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .unwrap_or(units_per_em / 2);

        log::debug!(
            "Loaded TrueType metrics: {} mapped characters, {} units/em",
            advances.len(),
            units_per_em
        );

        Ok(Self {
            advances,
            default_advance,
            units_per_em: f32::from(units_per_em),
        })
    }
}

impl TextMetrics for TrueTypeMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(*self.advances.get(&c).unwrap_or(&self.default_advance)))
            .sum();
        pt_to_mm(units as f32 * font_size / self.units_per_em)
    }
}

// ============================================================================
// Font selection
// ============================================================================

/// The font used for both measuring and rendering a document.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// PDF base-14 Helvetica (no embedding, Latin text only)
    Builtin,
    /// An external TrueType font, embedded into the PDF
    TrueType { path: PathBuf, data: Vec<u8> },
}

impl FontSource {
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(p) => {
                let data = std::fs::read(p)
                    .map_err(|e| AppError::FontError(format!("{}: {}", p.display(), e)))?;
                Ok(FontSource::TrueType {
                    path: p.to_path_buf(),
                    data,
                })
            }
            None => Ok(FontSource::Builtin),
        }
    }

    /// Metrics matching the font the renderer will use.
    pub fn metrics(&self) -> Result<Box<dyn TextMetrics>, AppError> {
        match self {
            FontSource::Builtin => Ok(Box::new(HelveticaMetrics)),
            FontSource::TrueType { data, .. } => Ok(Box::new(TrueTypeMetrics::from_bytes(data)?)),
        }
    }

    pub fn name(&self) -> String {
        match self {
            FontSource::Builtin => "Helvetica".to_string(),
            FontSource::TrueType { path, .. } => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "embedded".to_string()),
        }
    }
}
