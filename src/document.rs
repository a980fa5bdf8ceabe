//! Renderer-agnostic drawing primitives.
//!
//! Coordinates are millimetres from the bottom-left corner of the page; text
//! positions are baselines.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Questions with a blank rule for each answer
    Question,
    /// Questions with their answers filled in
    Answer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        /// Points
        font_size: f32,
        weight: FontWeight,
        text: String,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        /// Points
        thickness: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub kind: PageKind,
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Line { .. } => None,
        })
    }
}

/// A composed test: one page per `Page`, in print order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
}
