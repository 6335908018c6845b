//! Concrete collaborators for deck generation: HTTP fetching with proxy
//! awareness, the spreadsheet source and pdfium-based PDF rendering.

pub mod http;
pub mod pdf;
pub mod sheet;

pub use http::{AssetRoot, FetchTarget, HttpFetcher};
pub use pdf::PdfiumRasterizer;
pub use sheet::{load_table_file, SheetClient};
