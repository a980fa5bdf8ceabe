use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to create PDF: {0}")]
    PdfError(String),
    #[error("Failed to read workbook: {0}")]
    WorkbookError(String),
    #[error("Failed to read word list: {0}")]
    WordListError(String),
    #[error("Failed to load font: {0}")]
    FontError(String),
    #[error("Invalid arguments: {0}")]
    ArgumentError(String),
    #[error("Invalid layout: {0}")]
    LayoutError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
