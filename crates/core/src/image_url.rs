//! Image and spec-sheet URL resolution.
//!
//! Sheet cells reference images as direct links, Google Drive share links or
//! `=IMAGE("...")` formulas. Everything is normalized to a fetchable URL and
//! then wrapped in a same-origin proxy URL.

use crate::normalize::{clean_cell, HeaderMap, Row};
use regex::Regex;
use std::sync::LazyLock;

/// Drive share links: `drive.google.com/file/d/<ID>/...` or `open?id=<ID>`.
static DRIVE_SHARE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"drive\.google\.com/(?:file/d/|open\?id=)([A-Za-z0-9_-]+)").unwrap()
});

/// Any Drive-hosted file reference.
static DRIVE_FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)drive\.google\.com/(?:file/d/|open\?id=|uc\?)|googleusercontent\.com").unwrap()
});

/// Spreadsheet image formula.
static IMAGE_FORMULA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*=\s*IMAGE\s*\(\s*"([^"]+)""#).unwrap());

static IMAGE_EXTENSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:png|jpe?g|webp|gif|svg)(?:[?#]|$)").unwrap());

static PDF_EXTENSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.pdf(?:[?#]|$)").unwrap());

/// Hosts and path fragments that serve images without a file extension.
const IMAGE_HOST_KEYWORDS: &[&str] = &[
    "cloudinary",
    "imgix",
    "shopify",
    "squarespace-cdn",
    "cdn.",
    "/cdn/",
    "images.",
    "/images/",
    "/media/",
    "branding",
];

/// The stages of one resolved image reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRef {
    /// Cell value as found in the sheet.
    pub raw: Option<String>,
    /// Directly fetchable URL.
    pub direct: Option<String>,
    /// Same-origin proxy URL.
    pub proxied: Option<String>,
}

/// Starts with `http://`, `https://` or `/`.
pub fn looks_like_url(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || value.starts_with('/')
}

fn is_absolute(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Has an image extension, is a Drive file, or is served from a known image host.
/// PDFs never count, wherever they are hosted.
pub fn looks_like_image(value: &str) -> bool {
    if PDF_EXTENSION_REGEX.is_match(value) {
        return false;
    }
    let lower = value.to_lowercase();
    IMAGE_EXTENSION_REGEX.is_match(value)
        || DRIVE_FILE_REGEX.is_match(value)
        || IMAGE_HOST_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Extract the URL from an `=IMAGE("...")` formula.
pub fn parse_image_formula(value: &str) -> Option<String> {
    IMAGE_FORMULA_REGEX
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Rewrite a Drive share link to its direct-download form; other URLs pass through.
pub fn normalize_drive_url(url: &str) -> String {
    match DRIVE_SHARE_REGEX.captures(url).and_then(|c| c.get(1)) {
        Some(id) => format!(
            "https://drive.google.com/uc?export=download&id={}",
            id.as_str()
        ),
        None => url.to_string(),
    }
}

/// Wrap an absolute URL in a proxy endpoint; relative URLs are already same-origin.
pub fn proxy_url(endpoint: &str, direct: &str) -> String {
    if is_absolute(direct) {
        format!("{}?url={}", endpoint, urlencoding::encode(direct))
    } else {
        direct.to_string()
    }
}

/// Unwrap formulas and Drive links from one cell value.
fn direct_from_cell(value: &str) -> Option<String> {
    let value = clean_cell(value);
    let candidate = parse_image_formula(&value).unwrap_or(value);
    if looks_like_url(&candidate) {
        Some(normalize_drive_url(&candidate))
    } else {
        None
    }
}

/// Find and normalize the row's image.
pub fn resolve_image(row: &Row<'_>, map: &HeaderMap, endpoint: &str) -> ImageRef {
    let explicit = map.image_url.and_then(|idx| {
        let raw = row.raw_cell(idx);
        direct_from_cell(raw).map(|direct| (raw.trim().to_string(), direct))
    });

    // Spec-sheet and product-page links are never the picture, even on Drive.
    let found = explicit.or_else(|| {
        (0..row.width())
            .filter(|idx| Some(*idx) != map.pdf_url && Some(*idx) != map.url)
            .find_map(|idx| {
                let raw = row.raw_cell(idx);
                let direct = direct_from_cell(raw)?;
                looks_like_image(&direct).then(|| (raw.trim().to_string(), direct))
            })
    });

    match found {
        Some((raw, direct)) => ImageRef {
            raw: Some(raw),
            proxied: Some(proxy_url(endpoint, &direct)),
            direct: Some(direct),
        },
        None => ImageRef::default(),
    }
}

/// Find and normalize the row's spec-sheet PDF, returning `(direct, proxied)`.
pub fn resolve_pdf(
    row: &Row<'_>,
    map: &HeaderMap,
    endpoint: &str,
) -> (Option<String>, Option<String>) {
    let mapped = map.pdf_url.and_then(|idx| direct_from_cell(row.raw_cell(idx)));

    let direct = mapped.or_else(|| {
        (0..row.width()).find_map(|idx| {
            let value = clean_cell(row.raw_cell(idx));
            (is_absolute(&value) && PDF_EXTENSION_REGEX.is_match(&value)).then_some(value)
        })
    });

    match direct {
        Some(direct) => {
            let proxied = proxy_url(endpoint, &direct);
            (Some(direct), Some(proxied))
        }
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_header;

    fn resolve(headers: &[&str], cells: &[&str]) -> ImageRef {
        let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        let map = HeaderMap::resolve(&headers);
        resolve_image(&Row::new(&headers, &cells), &map, "/image-proxy")
    }

    #[test]
    fn test_direct_url_unchanged() {
        let image = resolve(&["Name", "Image"], &["Lamp", "https://cdn.example/img.png"]);
        assert_eq!(image.direct.as_deref(), Some("https://cdn.example/img.png"));
        assert_eq!(image.raw.as_deref(), Some("https://cdn.example/img.png"));
    }

    #[test]
    fn test_drive_share_link_rewritten() {
        assert_eq!(
            normalize_drive_url("https://drive.google.com/file/d/ABC123/view?usp=sharing"),
            "https://drive.google.com/uc?export=download&id=ABC123"
        );
        assert_eq!(
            normalize_drive_url("https://drive.google.com/open?id=Q_w-9"),
            "https://drive.google.com/uc?export=download&id=Q_w-9"
        );
        assert_eq!(
            normalize_drive_url("https://example.com/a.png"),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn test_proxy_wrapping() {
        assert_eq!(
            proxy_url("/image-proxy", "https://cdn.example/img.png"),
            "/image-proxy?url=https%3A%2F%2Fcdn.example%2Fimg.png"
        );
        assert_eq!(proxy_url("/image-proxy", "/branding/logo.png"), "/branding/logo.png");
    }

    #[test]
    fn test_image_formula() {
        assert_eq!(
            parse_image_formula(r#"=IMAGE("https://cdn.example/a.jpg", 1)"#).as_deref(),
            Some("https://cdn.example/a.jpg")
        );
        assert_eq!(parse_image_formula("https://cdn.example/a.jpg"), None);

        let image = resolve(&["Name", "Photo"], &["Lamp", r#"=image("https://x.example/p.webp")"#]);
        assert_eq!(image.direct.as_deref(), Some("https://x.example/p.webp"));
        assert_eq!(image.raw.as_deref(), Some(r#"=image("https://x.example/p.webp")"#));
    }

    #[test]
    fn test_scan_when_no_image_column() {
        let image = resolve(
            &["Name", "Link", "Asset"],
            &["Lamp", "https://shop.example/lamp", "https://files.example/lamp.JPG?v=2"],
        );
        assert_eq!(image.direct.as_deref(), Some("https://files.example/lamp.JPG?v=2"));
        assert_eq!(
            image.proxied.as_deref(),
            Some("/image-proxy?url=https%3A%2F%2Ffiles.example%2Flamp.JPG%3Fv%3D2")
        );
    }

    #[test]
    fn test_scan_accepts_cdn_and_drive() {
        let image = resolve(&["Name", "Asset"], &["Lamp", "https://res.cloudinary.com/x/upload/abc"]);
        assert!(image.direct.is_some());

        let image = resolve(
            &["Name", "Asset"],
            &["Lamp", "https://drive.google.com/file/d/ID9/view"],
        );
        assert_eq!(
            image.direct.as_deref(),
            Some("https://drive.google.com/uc?export=download&id=ID9")
        );
    }

    #[test]
    fn test_scan_skips_pdfs_on_cdn() {
        let image = resolve(&["Name", "Docs"], &["Lamp", "https://cdn.example/lamp.pdf"]);
        assert_eq!(image.direct, None);
    }

    #[test]
    fn test_scan_skips_drive_spec_sheet_column() {
        let headers: Vec<String> = ["SKU", "Name", "Spec Sheet"]
            .iter()
            .map(|h| normalize_header(h))
            .collect();
        let cells: Vec<String> = ["A1", "Lamp", "https://drive.google.com/file/d/PDF42/view"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let map = HeaderMap::resolve(&headers);
        let row = Row::new(&headers, &cells);

        assert_eq!(resolve_image(&row, &map, "/image-proxy"), ImageRef::default());
        let (pdf, _) = resolve_pdf(&row, &map, "/pdf-proxy");
        assert_eq!(
            pdf.as_deref(),
            Some("https://drive.google.com/uc?export=download&id=PDF42")
        );
    }

    #[test]
    fn test_scan_skips_product_page_column() {
        let image = resolve(
            &["Name", "Product Page"],
            &["Lamp", "https://shop.example/images/lamp"],
        );
        assert_eq!(image.direct, None);
    }

    #[test]
    fn test_relative_image_not_proxied() {
        let image = resolve(&["Name", "Image"], &["Lamp", "/branding/lamp.png"]);
        assert_eq!(image.direct.as_deref(), Some("/branding/lamp.png"));
        assert_eq!(image.proxied.as_deref(), Some("/branding/lamp.png"));
    }

    #[test]
    fn test_no_image_found() {
        let image = resolve(&["Name", "Image"], &["Lamp", "see catalog"]);
        assert_eq!(image, ImageRef::default());
    }

    #[test]
    fn test_pdf_scan_fallback() {
        let headers: Vec<String> = ["Name", "Docs"].iter().map(|h| normalize_header(h)).collect();
        let cells = vec!["Lamp".to_string(), "https://cdn.example/lamp.pdf".to_string()];
        let map = HeaderMap::resolve(&headers);
        let (direct, proxied) = resolve_pdf(&Row::new(&headers, &cells), &map, "/pdf-proxy");
        assert_eq!(direct.as_deref(), Some("https://cdn.example/lamp.pdf"));
        assert_eq!(
            proxied.as_deref(),
            Some("/pdf-proxy?url=https%3A%2F%2Fcdn.example%2Flamp.pdf")
        );
    }
}
