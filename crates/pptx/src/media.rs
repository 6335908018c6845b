//! Embedded picture preparation.
//!
//! PNG, JPEG and GIF go into the package untouched; anything else `image`
//! can decode is re-encoded as PNG. SVG is rasterized to PNG with `resvg`.

use deck_core::{Error, RasterPage, Result};
use image::{GenericImageView, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;

/// Rasterized SVGs get at least this many pixels on their long side.
const SVG_MIN_LONG_SIDE: f32 = 1200.0;

/// Upper bound on either side of a rasterized SVG.
const SVG_MAX_SIDE: f32 = 4096.0;

/// Media formats the package declares content types for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Gif,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Png => "png",
            MediaFormat::Jpeg => "jpeg",
            MediaFormat::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MediaFormat::Png => "image/png",
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Gif => "image/gif",
        }
    }

    pub const ALL: [MediaFormat; 3] = [MediaFormat::Png, MediaFormat::Jpeg, MediaFormat::Gif];
}

/// A picture ready to embed, with its pixel size for fitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub bytes: Vec<u8>,
    pub format: MediaFormat,
    pub width: u32,
    pub height: u32,
}

impl Picture {
    /// Sniff, decode and (if needed) transcode fetched image bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if looks_like_svg(&bytes) {
            return Self::from_svg(&bytes);
        }
        let format = image::guess_format(&bytes)
            .map_err(|e| Error::ImageError(format!("Unrecognized image data: {}", e)))?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| Error::ImageError(format!("Failed to decode {:?}: {}", format, e)))?;
        let (width, height) = decoded.dimensions();

        let kept = match format {
            ImageFormat::Png => Some(MediaFormat::Png),
            ImageFormat::Jpeg => Some(MediaFormat::Jpeg),
            ImageFormat::Gif => Some(MediaFormat::Gif),
            _ => None,
        };

        match kept {
            Some(media) => Ok(Self {
                bytes,
                format: media,
                width,
                height,
            }),
            None => {
                log::debug!("Transcoding {:?} image to PNG", format);
                let mut png = Vec::new();
                decoded
                    .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                    .map_err(|e| Error::ImageError(format!("Failed to encode PNG: {}", e)))?;
                Ok(Self {
                    bytes: png,
                    format: MediaFormat::Png,
                    width,
                    height,
                })
            }
        }
    }

    /// Render SVG markup to PNG, scaling small drawings up.
    fn from_svg(bytes: &[u8]) -> Result<Self> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| Error::ImageError(format!("Failed to parse SVG: {}", e)))?;
        let size = tree.size();
        let long_side = size.width().max(size.height());
        if long_side <= 0.0 {
            return Err(Error::ImageError("SVG has no size".to_string()));
        }

        let scale = (SVG_MIN_LONG_SIDE / long_side)
            .max(1.0)
            .min(SVG_MAX_SIDE / long_side);
        let width = (size.width() * scale).round().max(1.0) as u32;
        let height = (size.height() * scale).round().max(1.0) as u32;
        log::debug!("Rasterizing SVG at {}x{}", width, height);

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::ImageError(format!("Bad SVG raster size {}x{}", width, height)))?;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let rgba: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        let raster = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| Error::ImageError("SVG raster buffer size mismatch".to_string()))?;

        let mut png = Vec::new();
        raster
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::ImageError(format!("Failed to encode PNG: {}", e)))?;

        Ok(Self {
            bytes: png,
            format: MediaFormat::Png,
            width,
            height,
        })
    }

    /// Wrap an already rendered PDF page.
    pub fn from_raster(page: RasterPage) -> Self {
        Self {
            bytes: page.png,
            format: MediaFormat::Png,
            width: page.width,
            height: page.height,
        }
    }
}

/// SVG markup, optionally behind an XML declaration, comments or a BOM.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_lowercase();
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with('<') && head.contains("<svg"))
}

#[cfg(test)]
pub(crate) fn test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([200, 120, 40]),
    ));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_kept_as_is() {
        let bytes = test_image(8, 4, ImageFormat::Png);
        let picture = Picture::from_bytes(bytes.clone()).unwrap();
        assert_eq!(picture.format, MediaFormat::Png);
        assert_eq!((picture.width, picture.height), (8, 4));
        assert_eq!(picture.bytes, bytes);
    }

    #[test]
    fn test_jpeg_kept_as_is() {
        let picture = Picture::from_bytes(test_image(5, 7, ImageFormat::Jpeg)).unwrap();
        assert_eq!(picture.format, MediaFormat::Jpeg);
        assert_eq!((picture.width, picture.height), (5, 7));
    }

    #[test]
    fn test_bmp_transcoded_to_png() {
        let picture = Picture::from_bytes(test_image(3, 3, ImageFormat::Bmp)).unwrap();
        assert_eq!(picture.format, MediaFormat::Png);
        assert_eq!(image::guess_format(&picture.bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_svg_rasterized_to_png() {
        let svg = br##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20">
  <rect width="40" height="20" fill="#c87828"/>
</svg>"##;
        let picture = Picture::from_bytes(svg.to_vec()).unwrap();
        assert_eq!(picture.format, MediaFormat::Png);
        assert_eq!((picture.width, picture.height), (1200, 600));

        let decoded = image::load_from_memory(&picture.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(600, 300).0, [200, 120, 40, 255]);
    }

    #[test]
    fn test_broken_svg_is_an_error() {
        let result = Picture::from_bytes(b"<svg xmlns=\"http://www.w3.org/2000/svg\"".to_vec());
        assert!(matches!(result, Err(Error::ImageError(_))));
    }

    #[test]
    fn test_garbage_is_an_error() {
        let result = Picture::from_bytes(b"<html>not found</html>".to_vec());
        assert!(matches!(result, Err(Error::ImageError(_))));
    }
}
