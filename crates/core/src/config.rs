//! Deck generation settings.
//!
//! Every field has a default so a partial JSON file (or none at all) works.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Same-origin endpoints that re-serve third-party bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyEndpoints {
    pub image: String,
    pub pdf: String,
}

impl Default for ProxyEndpoints {
    fn default() -> Self {
        Self {
            image: "/image-proxy".to_string(),
            pdf: "/pdf-proxy".to_string(),
        }
    }
}

/// Layout and source settings for deck generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Branding images for the opening full-bleed slides.
    pub cover_images: Vec<String>,
    /// Branding images for the closing full-bleed slides.
    pub back_images: Vec<String>,
    /// Directory or URL that relative branding paths resolve against.
    pub asset_root: Option<String>,
    /// Text shown in every slide footer next to the page number.
    pub brand: String,
    pub max_bullets: usize,
    pub name_max_chars: usize,
    pub description_max_chars: usize,
    /// Spec-sheet pages rendered per product.
    pub pdf_max_pages: usize,
    pub pdf_render_scale: f32,
    pub proxy: ProxyEndpoints,
    /// Origin that same-origin paths are resolved against, e.g. `https://deck.example.com`.
    pub public_origin: Option<String>,
    pub sheet_endpoint: String,
    pub sheet_range: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            cover_images: vec![
                "/branding/cover-1.jpg".to_string(),
                "/branding/cover-2.jpg".to_string(),
            ],
            back_images: vec![
                "/branding/back-1.jpg".to_string(),
                "/branding/back-2.jpg".to_string(),
            ],
            asset_root: None,
            brand: "Product Proposal".to_string(),
            max_bullets: 6,
            name_max_chars: 90,
            description_max_chars: 420,
            pdf_max_pages: 2,
            pdf_render_scale: 1.5,
            proxy: ProxyEndpoints::default(),
            public_origin: None,
            sheet_endpoint: "/sheet-data".to_string(),
            sheet_range: "Products!A1:Z1000".to_string(),
        }
    }
}

impl DeckConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the assembler cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.pdf_render_scale.is_finite() && self.pdf_render_scale > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "pdf_render_scale must be positive, got {}",
                self.pdf_render_scale
            )));
        }
        if self.proxy.image.trim().is_empty() || self.proxy.pdf.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "proxy endpoints must not be empty".to_string(),
            ));
        }
        if self.description_max_chars == 0 || self.name_max_chars == 0 {
            return Err(Error::InvalidConfig(
                "text clamps must be at least one character".to_string(),
            ));
        }
        Ok(())
    }
}
