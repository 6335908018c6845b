//! Spec-sheet rasterization with pdfium.

use deck_core::{Error, PdfRasterizer, RasterPage, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::Path;

/// Renders PDF pages to PNG through a pdfium library bound once at startup.
///
/// A missing library is not fatal: every call then fails with a
/// [`Error::PdfError`], which the assembler turns into "link only".
pub struct PdfiumRasterizer {
    pdfium: std::result::Result<Pdfium, String>,
}

impl PdfiumRasterizer {
    /// Bind the system pdfium library.
    pub fn new() -> Self {
        Self::from_bindings(Pdfium::bind_to_system_library())
    }

    /// Bind the pdfium library found in `dir`, falling back to the system one.
    pub fn from_directory(dir: &Path) -> Self {
        let path = Pdfium::pdfium_platform_library_name_at_path(dir);
        Self::from_bindings(
            Pdfium::bind_to_library(&path).or_else(|_| Pdfium::bind_to_system_library()),
        )
    }

    fn from_bindings(
        bindings: std::result::Result<Box<dyn PdfiumLibraryBindings>, PdfiumError>,
    ) -> Self {
        let pdfium = match bindings {
            Ok(bindings) => Ok(Pdfium::new(bindings)),
            Err(e) => {
                log::warn!("pdfium unavailable, spec sheets will be linked only: {}", e);
                Err(e.to_string())
            }
        };
        Self { pdfium }
    }

    pub fn is_available(&self) -> bool {
        self.pdfium.is_ok()
    }
}

impl Default for PdfiumRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &[u8], max_pages: usize, scale: f32) -> Result<Vec<RasterPage>> {
        let pdfium = self
            .pdfium
            .as_ref()
            .map_err(|e| Error::PdfError(format!("pdfium library not loaded: {}", e)))?;

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| Error::PdfError(format!("Failed to open PDF: {}", e)))?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let mut pages = Vec::new();
        for (idx, page) in document.pages().iter().enumerate().take(max_pages) {
            let number = idx + 1;
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| Error::PdfError(format!("Failed to render page {}: {}", number, e)))?;

            let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
            let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
                Error::PdfError(format!("Page {} bitmap has an unexpected size", number))
            })?;

            pages.push(RasterPage {
                number,
                png: encode_png(rgba)?,
                width,
                height,
            });
        }

        log::debug!("Rasterized {} of {} pages", pages.len(), document.pages().len());
        Ok(pages)
    }
}

fn encode_png(image: RgbaImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| Error::ImageError(format!("Failed to encode PNG: {}", e)))?;
    Ok(png)
}
