//! Error types for catalog normalization and deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading the catalog or building a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a local file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A JSON document (sheet payload, session, config) could not be parsed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The upstream server answered with a non-success status.
    #[error("Upstream fetch of {url} failed with status {status}")]
    Upstream { url: String, status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("Network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// The sheet payload did not contain a usable table.
    #[error("Invalid sheet data: {0}")]
    InvalidSheet(String),

    /// Fetched bytes could not be decoded as an image.
    #[error("Image error: {0}")]
    ImageError(String),

    /// A spec-sheet PDF could not be rendered.
    #[error("PDF rendering error: {0}")]
    PdfError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML writing or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Writing generated XML into a buffer failed.
    #[error("Formatting error: {0}")]
    FmtError(#[from] std::fmt::Error),

    /// The configuration file holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Export was requested with an empty selection.
    #[error("No products selected. Select at least one product before exporting.")]
    NoProductsSelected,
}
