// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read PDF: {0}")]
    Pdf(#[from] pdfplumber::PdfError),

    #[error("document has no pages: {0}")]
    NoPages(String),

    #[error("no table found on first page of {0}")]
    NoTable(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("cannot determine report variant: {0}")]
    UnsupportedReport(String),

    #[error("malformed table: {0}")]
    MalformedTable(String),
}

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Report processing failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Emission failed: {0}")]
    Emit(#[from] EmitError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
