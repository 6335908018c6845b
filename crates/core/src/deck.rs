//! Deck planning.
//!
//! Turns the selected products and the export form into the fixed slide
//! sequence: covers, title, one divider per category followed by its
//! products, back covers. Planning is pure; fetching and rendering happen in
//! the PPTX backend.

use crate::config::DeckConfig;
use crate::types::{ExportForm, ProductRecord};
use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Bucket for products without a category.
pub const OTHER_CATEGORY: &str = "Other";

/// Shown on the title slide for empty form fields.
pub const PLACEHOLDER: &str = "—";

const ELLIPSIS: char = '…';

static FILE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// The five slide shapes a deck is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlideKind {
    FullBleedImage,
    Title,
    CategoryDivider,
    Product,
    SpecSheetPage,
}

impl SlideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideKind::FullBleedImage => "full-bleed",
            SlideKind::Title => "title",
            SlideKind::CategoryDivider => "divider",
            SlideKind::Product => "product",
            SlideKind::SpecSheetPage => "spec-sheet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "full-bleed" => Some(SlideKind::FullBleedImage),
            "title" => Some(SlideKind::Title),
            "divider" => Some(SlideKind::CategoryDivider),
            "product" => Some(SlideKind::Product),
            "spec-sheet" => Some(SlideKind::SpecSheetPage),
            _ => None,
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a full-bleed slide sits in the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverRole {
    Front,
    Back,
}

/// Text block of the title slide, placeholders already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBlock {
    pub project_name: String,
    pub client_name: String,
    pub prepared_by: String,
    pub contact_line: String,
    pub date: String,
}

impl TitleBlock {
    pub fn from_form(form: &ExportForm) -> Self {
        let prepared_by = [&form.contact_name, &form.contact_title, &form.company]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let contact_line = [&form.email, &form.phone]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("  |  ");

        Self {
            project_name: or_placeholder(&form.project_name),
            client_name: or_placeholder(&form.client_name),
            prepared_by: or_placeholder(&prepared_by),
            contact_line: or_placeholder(&contact_line),
            date: or_placeholder(&form.date),
        }
    }
}

fn or_placeholder(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// Everything a product slide shows, clamped to the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSlide {
    pub name: String,
    pub code: String,
    pub description: String,
    pub bullets: Vec<String>,
    /// URL the picture is fetched from (the proxied form when available).
    pub image_url: Option<String>,
    /// External product page.
    pub page_url: Option<String>,
    /// URL the spec sheet is fetched from for rendering.
    pub pdf_fetch_url: Option<String>,
    /// URL the spec-sheet hyperlink points at.
    pub pdf_link: Option<String>,
}

/// One planned slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedSlide {
    FullBleed {
        role: CoverRole,
        image_url: Option<String>,
    },
    Title(TitleBlock),
    Divider {
        category: String,
    },
    Product(ProductSlide),
}

impl PlannedSlide {
    pub fn kind(&self) -> SlideKind {
        match self {
            PlannedSlide::FullBleed { .. } => SlideKind::FullBleedImage,
            PlannedSlide::Title(_) => SlideKind::Title,
            PlannedSlide::Divider { .. } => SlideKind::CategoryDivider,
            PlannedSlide::Product(_) => SlideKind::Product,
        }
    }
}

/// The ordered slide plan for one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckPlan {
    /// Document title stored in the package properties.
    pub title: String,
    pub file_name: String,
    pub slides: Vec<PlannedSlide>,
}

impl DeckPlan {
    pub fn kinds(&self) -> Vec<SlideKind> {
        self.slides.iter().map(PlannedSlide::kind).collect()
    }
}

/// Label used to group a product: its category, or `Other`.
pub fn category_label(category: &str) -> &str {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        OTHER_CATEGORY
    } else {
        trimmed
    }
}

/// Group products by category in first-seen order, keeping input order inside each group.
pub fn group_by_category(products: &[ProductRecord]) -> Vec<(String, Vec<&ProductRecord>)> {
    let mut groups: Vec<(String, Vec<&ProductRecord>)> = Vec::new();

    for product in products {
        let label = category_label(&product.category);
        match groups.iter_mut().find(|(name, _)| name.as_str() == label) {
            Some((_, members)) => members.push(product),
            None => groups.push((label.to_string(), vec![product])),
        }
    }

    groups
}

/// Shorten text to at most `max_chars` characters at a word boundary and append an ellipsis.
pub fn clamp_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let head: String = text.chars().take(max_chars).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &head[..pos],
        _ => head.as_str(),
    };
    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));

    format!("{}{}", cut, ELLIPSIS)
}

/// Download name: project name with non-word runs collapsed to `_`.
pub fn export_file_name(project_name: &str) -> String {
    let collapsed = FILE_NAME_REGEX.replace_all(project_name.trim(), "_");
    let stem = collapsed.trim_matches('_');
    let stem = if stem.is_empty() { "Proposal" } else { stem };
    format!("{}.pptx", stem)
}

/// Prefix a same-origin path with the public origin, when there is one.
pub fn absolutize(url: &str, origin: Option<&str>) -> Option<String> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(url.to_string());
    }
    origin.map(|o| format!("{}{}", o.trim_end_matches('/'), url))
}

fn product_slide(product: &ProductRecord, config: &DeckConfig) -> ProductSlide {
    let bullets = product
        .specs_bullets
        .iter()
        .take(config.max_bullets)
        .cloned()
        .collect();

    // Hyperlink targets must be absolute.
    let pdf_link = product
        .pdf_proxied
        .as_deref()
        .and_then(|p| absolutize(p, config.public_origin.as_deref()))
        .or_else(|| {
            product
                .pdf_url
                .as_deref()
                .and_then(|p| absolutize(p, config.public_origin.as_deref()))
        });

    ProductSlide {
        name: clamp_text(product.display_name(), config.name_max_chars),
        code: product.code.trim().to_string(),
        description: clamp_text(&product.description, config.description_max_chars),
        bullets,
        image_url: product.image_proxied.clone().or_else(|| product.image_url.clone()),
        page_url: product.url.clone(),
        pdf_fetch_url: product.pdf_proxied.clone().or_else(|| product.pdf_url.clone()),
        pdf_link,
    }
}

/// Build the slide plan. An empty selection is the one hard failure.
pub fn plan_deck(
    products: &[ProductRecord],
    form: &ExportForm,
    config: &DeckConfig,
) -> Result<DeckPlan> {
    if products.is_empty() {
        return Err(Error::NoProductsSelected);
    }

    let mut slides = Vec::new();

    for image in &config.cover_images {
        slides.push(PlannedSlide::FullBleed {
            role: CoverRole::Front,
            image_url: Some(image.clone()),
        });
    }

    slides.push(PlannedSlide::Title(TitleBlock::from_form(form)));

    for (category, members) in group_by_category(products) {
        log::debug!("Category '{}' with {} products", category, members.len());
        slides.push(PlannedSlide::Divider { category });
        for product in members {
            slides.push(PlannedSlide::Product(product_slide(product, config)));
        }
    }

    for image in &config.back_images {
        slides.push(PlannedSlide::FullBleed {
            role: CoverRole::Back,
            image_url: Some(image.clone()),
        });
    }

    let title = if form.project_name.trim().is_empty() {
        "Product Proposal".to_string()
    } else {
        form.project_name.trim().to_string()
    };

    Ok(DeckPlan {
        title,
        file_name: export_file_name(&form.project_name),
        slides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str, category: &str) -> ProductRecord {
        ProductRecord {
            code: code.to_string(),
            name: format!("Product {code}"),
            category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_deck_structure() {
        let products = vec![product("1", "A"), product("2", "A"), product("3", "B")];
        let plan = plan_deck(&products, &ExportForm::default(), &DeckConfig::default()).unwrap();

        use SlideKind::*;
        assert_eq!(
            plan.kinds(),
            vec![
                FullBleedImage,
                FullBleedImage,
                Title,
                CategoryDivider,
                Product,
                Product,
                CategoryDivider,
                Product,
                FullBleedImage,
                FullBleedImage,
            ]
        );
        assert_eq!(
            plan.slides[3],
            PlannedSlide::Divider {
                category: "A".to_string()
            }
        );
    }

    #[test]
    fn test_interleaved_categories_grouped_first_seen() {
        let products = vec![product("1", "B"), product("2", ""), product("3", "B"), product("4", "  ")];
        let groups = group_by_category(&products);
        let summary: Vec<(String, Vec<String>)> = groups
            .into_iter()
            .map(|(c, ps)| (c, ps.into_iter().map(|p| p.code.clone()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("B".to_string(), vec!["1".to_string(), "3".to_string()]),
                ("Other".to_string(), vec!["2".to_string(), "4".to_string()]),
            ]
        );
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let result = plan_deck(&[], &ExportForm::default(), &DeckConfig::default());
        assert!(matches!(result, Err(Error::NoProductsSelected)));
    }

    #[test]
    fn test_title_placeholders() {
        let block = TitleBlock::from_form(&ExportForm::default());
        assert_eq!(block.project_name, PLACEHOLDER);
        assert_eq!(block.contact_line, PLACEHOLDER);

        let block = TitleBlock::from_form(&ExportForm {
            contact_name: "Sam".to_string(),
            company: "Acme".to_string(),
            email: "sam@acme.test".to_string(),
            phone: "555-0100".to_string(),
            ..Default::default()
        });
        assert_eq!(block.prepared_by, "Sam, Acme");
        assert_eq!(block.contact_line, "sam@acme.test  |  555-0100");
    }

    #[test]
    fn test_clamp_text_word_boundary() {
        assert_eq!(clamp_text("Short text", 50), "Short text");
        assert_eq!(
            clamp_text("A sturdy oak table, finished by hand", 20),
            "A sturdy oak table…"
        );
        assert_eq!(clamp_text("Supercalifragilistic", 5), "Super…");
    }

    #[test]
    fn test_bullets_capped_on_slide() {
        let mut record = product("1", "A");
        record.specs_bullets = (1..=9).map(|i| format!("B{i}")).collect();
        let config = DeckConfig::default();
        let slide = product_slide(&record, &config);
        assert_eq!(slide.bullets.len(), config.max_bullets);
        assert_eq!(slide.bullets[0], "B1");
    }

    #[test]
    fn test_pdf_link_prefers_public_origin() {
        let mut record = product("1", "A");
        record.pdf_url = Some("https://cdn.example/a.pdf".to_string());
        record.pdf_proxied = Some("/pdf-proxy?url=https%3A%2F%2Fcdn.example%2Fa.pdf".to_string());

        let slide = product_slide(&record, &DeckConfig::default());
        assert_eq!(slide.pdf_link.as_deref(), Some("https://cdn.example/a.pdf"));

        let config = DeckConfig {
            public_origin: Some("https://deck.example.com/".to_string()),
            ..Default::default()
        };
        let slide = product_slide(&record, &config);
        assert_eq!(
            slide.pdf_link.as_deref(),
            Some("https://deck.example.com/pdf-proxy?url=https%3A%2F%2Fcdn.example%2Fa.pdf")
        );
    }

    #[test]
    fn test_relative_pdf_link_needs_public_origin() {
        let mut record = product("1", "A");
        record.pdf_url = Some("/docs/a.pdf".to_string());
        record.pdf_proxied = Some("/docs/a.pdf".to_string());

        let slide = product_slide(&record, &DeckConfig::default());
        assert_eq!(slide.pdf_link, None);
        assert_eq!(slide.pdf_fetch_url.as_deref(), Some("/docs/a.pdf"));

        let config = DeckConfig {
            public_origin: Some("https://deck.example.com".to_string()),
            ..Default::default()
        };
        let slide = product_slide(&record, &config);
        assert_eq!(slide.pdf_link.as_deref(), Some("https://deck.example.com/docs/a.pdf"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Lobby Refresh: Phase #2"), "Lobby_Refresh_Phase_2.pptx");
        assert_eq!(export_file_name("  "), "Proposal.pptx");
        assert_eq!(export_file_name("Q3_plan"), "Q3_plan.pptx");
    }

    #[test]
    fn test_slide_kind_names_round_trip() {
        for kind in [
            SlideKind::FullBleedImage,
            SlideKind::Title,
            SlideKind::CategoryDivider,
            SlideKind::Product,
            SlideKind::SpecSheetPage,
        ] {
            assert_eq!(SlideKind::from_name(kind.as_str()), Some(kind));
        }
    }
}
