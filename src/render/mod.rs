//! Output back ends for a composed `Document`.

pub mod html;
pub mod pdf;

pub use html::render_html;
pub use pdf::render_pdf;
