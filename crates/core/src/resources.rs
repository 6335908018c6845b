//! Seams to the remote world: byte fetching and PDF rasterization.
//!
//! The assembler only sees these traits, so a failing fetch is just an
//! `Err` it can drop on the floor.

use crate::Result;

/// Bytes returned by a fetch, with the upstream content type when known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedResource {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedResource {
    pub fn new(content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type,
            bytes,
        }
    }
}

/// `fetch(url) -> (contentType, bytes)`.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource>;
}

/// One rendered PDF page, PNG encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterPage {
    /// 1-based page number in the source PDF.
    pub number: usize,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Renders the leading pages of a PDF to raster images.
pub trait PdfRasterizer {
    fn rasterize(&self, pdf: &[u8], max_pages: usize, scale: f32) -> Result<Vec<RasterPage>>;
}
