//! Row normalization for spreadsheet-backed product catalogs.
//!
//! Finds the header row, resolves column-name synonyms into a [`HeaderMap`],
//! and turns each remaining row into a [`ProductRecord`].

use crate::bullets::extract_bullets;
use crate::config::ProxyEndpoints;
use crate::image_url::{resolve_image, resolve_pdf};
use crate::types::{ProductRecord, RawTable};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of spaces and tabs into one.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());

/// Only this many leading rows are considered when looking for the header.
const HEADER_SCAN_ROWS: usize = 3;

/// Clean a raw cell: NFC, unified line endings, collapsed spaces, trimmed.
pub fn clean_cell(text: &str) -> String {
    let text: String = text.nfc().collect();
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| WHITESPACE_COLLAPSE_REGEX.replace_all(line, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Normalize header text for synonym matching.
pub fn normalize_header(text: &str) -> String {
    clean_cell(text)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The product attributes downstream code depends on by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Code,
    Description,
    Category,
    Url,
    ImageUrl,
    SpecsBullets,
    PdfUrl,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::Name,
        CanonicalField::Code,
        CanonicalField::Description,
        CanonicalField::Category,
        CanonicalField::Url,
        CanonicalField::ImageUrl,
        CanonicalField::SpecsBullets,
        CanonicalField::PdfUrl,
    ];

    /// Accepted header strings, lowercase, in priority order.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            CanonicalField::Name => &[
                "name",
                "product",
                "product name",
                "item name",
                "title",
                "product title",
            ],
            CanonicalField::Code => &[
                "code",
                "sku",
                "product code",
                "item code",
                "item #",
                "model",
                "model number",
                "part number",
                "part #",
            ],
            CanonicalField::Description => &[
                "description",
                "desc",
                "product description",
                "summary",
                "overview",
            ],
            CanonicalField::Category => &[
                "category",
                "product category",
                "type",
                "product type",
                "collection",
                "group",
            ],
            CanonicalField::Url => &[
                "url",
                "link",
                "product url",
                "product link",
                "product page",
                "page",
                "website",
            ],
            CanonicalField::ImageUrl => &[
                "image",
                "image url",
                "picture",
                "photo",
                "thumbnail",
                "main image",
                "primary image",
                "image link",
                "img",
            ],
            CanonicalField::SpecsBullets => &[
                "bullets",
                "specs bullets",
                "spec bullets",
                "bullet points",
                "specs",
            ],
            CanonicalField::PdfUrl => &[
                "pdf",
                "pdf url",
                "pdf link",
                "spec sheet",
                "spec sheet url",
                "spec sheet pdf",
                "specsheet",
                "cut sheet",
                "datasheet",
                "data sheet",
            ],
        }
    }
}

/// Canonical field → column index, resolved once per fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub name: Option<usize>,
    pub code: Option<usize>,
    pub description: Option<usize>,
    pub category: Option<usize>,
    pub url: Option<usize>,
    pub image_url: Option<usize>,
    pub specs_bullets: Option<usize>,
    pub pdf_url: Option<usize>,
}

impl HeaderMap {
    /// Resolve canonical fields against normalized header cells.
    ///
    /// Synonyms are tried in priority order; the first header that equals a
    /// synonym wins. A column already claimed by another field is skipped.
    pub fn resolve(headers: &[String]) -> Self {
        let mut map = HeaderMap::default();
        let mut claimed = vec![false; headers.len()];

        for field in CanonicalField::ALL {
            let found = field.synonyms().iter().find_map(|synonym| {
                headers
                    .iter()
                    .enumerate()
                    .find(|(idx, header)| !claimed[*idx] && header.as_str() == *synonym)
                    .map(|(idx, _)| idx)
            });
            if let Some(idx) = found {
                claimed[idx] = true;
                map.set(field, idx);
            }
        }

        map
    }

    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        match field {
            CanonicalField::Name => self.name,
            CanonicalField::Code => self.code,
            CanonicalField::Description => self.description,
            CanonicalField::Category => self.category,
            CanonicalField::Url => self.url,
            CanonicalField::ImageUrl => self.image_url,
            CanonicalField::SpecsBullets => self.specs_bullets,
            CanonicalField::PdfUrl => self.pdf_url,
        }
    }

    fn set(&mut self, field: CanonicalField, idx: usize) {
        let slot = match field {
            CanonicalField::Name => &mut self.name,
            CanonicalField::Code => &mut self.code,
            CanonicalField::Description => &mut self.description,
            CanonicalField::Category => &mut self.category,
            CanonicalField::Url => &mut self.url,
            CanonicalField::ImageUrl => &mut self.image_url,
            CanonicalField::SpecsBullets => &mut self.specs_bullets,
            CanonicalField::PdfUrl => &mut self.pdf_url,
        };
        *slot = Some(idx);
    }

    /// Whether a column index is claimed by any canonical field.
    pub fn is_mapped(&self, idx: usize) -> bool {
        CanonicalField::ALL
            .iter()
            .any(|field| self.get(*field) == Some(idx))
    }
}

/// A data row viewed through its normalized headers.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn new(headers: &'a [String], cells: &'a [String]) -> Self {
        Self { headers, cells }
    }

    /// Cleaned cell value, empty when the row is shorter than the index.
    pub fn cell(&self, idx: Option<usize>) -> String {
        idx.and_then(|i| self.cells.get(i))
            .map(|c| clean_cell(c))
            .unwrap_or_default()
    }

    /// Uncleaned cell value.
    pub fn raw_cell(&self, idx: usize) -> &'a str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Normalized header for a column, empty for cells past the header.
    pub fn header(&self, idx: usize) -> &'a str {
        self.headers.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Number of columns covered by either the header or this row.
    pub fn width(&self) -> usize {
        self.headers.len().max(self.cells.len())
    }

    /// `(index, normalized header, cleaned value)` for every non-empty cell.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &'a str, String)> + '_ {
        (0..self.width()).filter_map(move |idx| {
            let value = self.cell(Some(idx));
            if value.is_empty() {
                None
            } else {
                Some((idx, self.header(idx), value))
            }
        })
    }
}

/// Pick the header row: most non-blank cells among the first rows, lowest index on ties.
pub fn detect_header_row(table: &RawTable) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;

    for (idx, row) in table.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let filled = row.iter().filter(|c| !c.trim().is_empty()).count();
        match best {
            Some((_, count)) if count >= filled => {}
            _ => best = Some((idx, filled)),
        }
    }

    best.map(|(idx, _)| idx)
}

/// Converts a raw sheet table into product records.
#[derive(Debug, Clone, Default)]
pub struct RowNormalizer {
    proxy: ProxyEndpoints,
}

impl RowNormalizer {
    /// Create a normalizer using the default proxy endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom same-origin proxy endpoints.
    pub fn with_proxy(mut self, proxy: ProxyEndpoints) -> Self {
        self.proxy = proxy;
        self
    }

    /// Normalize a whole table. An empty table yields no records.
    pub fn normalize(&self, table: &RawTable) -> Vec<ProductRecord> {
        let Some(header_idx) = detect_header_row(table) else {
            log::debug!("Empty sheet, no products");
            return Vec::new();
        };

        let headers: Vec<String> = table[header_idx].iter().map(|h| normalize_header(h)).collect();
        let map = HeaderMap::resolve(&headers);
        log::debug!("Header row {} resolved to {:?}", header_idx, map);

        let mut products = Vec::new();
        let mut dropped = 0usize;

        for cells in &table[header_idx + 1..] {
            let row = Row::new(&headers, cells);
            let record = self.normalize_row(&row, &map);
            if record.is_identifiable() {
                products.push(record);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            log::debug!("Dropped {} blank rows", dropped);
        }

        products
    }

    /// Normalize a single row against a resolved header map.
    pub fn normalize_row(&self, row: &Row<'_>, map: &HeaderMap) -> ProductRecord {
        let image = resolve_image(row, map, &self.proxy.image);
        let (pdf_url, pdf_proxied) = resolve_pdf(row, map, &self.proxy.pdf);
        let url = Some(row.cell(map.url)).filter(|u| !u.is_empty());

        ProductRecord {
            code: row.cell(map.code),
            name: row.cell(map.name),
            description: row.cell(map.description),
            specs_bullets: extract_bullets(row, map),
            image_url: image.direct,
            image_proxied: image.proxied,
            pdf_url,
            pdf_proxied,
            category: row.cell(map.category),
            url,
        }
    }
}
