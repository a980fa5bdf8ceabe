//! Vocabulary test sheet generator.
//!
//! Rows from a word-list workbook are sampled into forty test items, each
//! question and answer is fitted into its grid cell by shrinking and wrapping,
//! and the result is laid out as a question page followed by an answer page.

pub mod compose;
pub mod config;
pub mod document;
pub mod error;
pub mod fit;
pub mod metrics;
pub mod model;
pub mod render;
pub mod select;
pub mod source;

pub use compose::{Header, TestSheetComposer};
pub use config::{LayoutConfig, PageGeometry};
pub use document::{Document, DrawOp, Page, PageKind};
pub use error::AppError;
pub use fit::fit_text;
pub use metrics::{FontSource, HelveticaMetrics, TextMetrics, TrueTypeMetrics};
pub use model::{Entry, FitBudget, FittedBlock, TestItem, ITEMS_PER_TEST};
pub use select::select_items;
