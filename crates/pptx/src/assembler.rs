//! Document assembly: deck plan in, `.pptx` bytes out.
//!
//! Every remote fetch is optional. A failed image leaves its slide without
//! the picture; a failed spec sheet leaves only the hyperlink. Only the
//! empty-selection precondition stops a build.

use crate::layout::{
    contain_fit, cover_crop, product_image_region, product_links_region, product_text_region,
    spec_sheet_heading_region, spec_sheet_image_region, Crop, Rect,
};
use crate::media::Picture;
use crate::package::PackageWriter;
use crate::shapes::{Align, Anchor, Paragraph, TextBox, TextRun};
use crate::slide::DeckSlide;
use deck_core::deck::{ProductSlide, TitleBlock};
use deck_core::{
    plan_deck, DeckConfig, DeckPlan, ExportForm, Fetcher, PdfRasterizer, PlannedSlide,
    ProductRecord, Result, SlideKind,
};
use std::collections::HashMap;

const DARK: &str = "1F2A44";
const WHITE: &str = "FFFFFF";
const MUTED: &str = "7F7F7F";
const TEXT: &str = "262626";
const LINK: &str = "0563C1";
const PLACEHOLDER_FILL: &str = "F2F2F2";

/// A finished deck and what happened while building it.
#[derive(Debug, Clone)]
pub struct AssembledDeck {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub kinds: Vec<SlideKind>,
    /// Fetch and render failures that were skipped.
    pub warnings: Vec<String>,
}

/// Fetched media already stored in the package.
#[derive(Debug, Clone)]
struct StoredMedia {
    name: String,
    width: u32,
    height: u32,
}

struct RenderState {
    package: PackageWriter,
    warnings: Vec<String>,
    /// Keyed by URL; failures are remembered too.
    media: HashMap<String, Option<StoredMedia>>,
}

impl RenderState {
    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Builds `.pptx` decks from selected products.
pub struct DeckAssembler<'a> {
    fetcher: &'a dyn Fetcher,
    rasterizer: &'a dyn PdfRasterizer,
    config: DeckConfig,
}

impl<'a> DeckAssembler<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, rasterizer: &'a dyn PdfRasterizer) -> Self {
        Self {
            fetcher,
            rasterizer,
            config: DeckConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DeckConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// Plan and render a deck. Fails only when `products` is empty or the
    /// package itself cannot be written.
    pub fn assemble(&self, products: &[ProductRecord], form: &ExportForm) -> Result<AssembledDeck> {
        let plan = plan_deck(products, form, &self.config)?;
        log::info!(
            "Building '{}' with {} products ({} planned slides)",
            plan.file_name,
            products.len(),
            plan.slides.len()
        );
        self.render(&plan, &form.contact_name)
    }

    pub fn render(&self, plan: &DeckPlan, creator: &str) -> Result<AssembledDeck> {
        let mut state = RenderState {
            package: PackageWriter::new(plan.title.clone()).with_creator(creator),
            warnings: Vec::new(),
            media: HashMap::new(),
        };

        for planned in &plan.slides {
            match planned {
                PlannedSlide::FullBleed { image_url, .. } => {
                    let slide = self.full_bleed_slide(&mut state, image_url.as_deref());
                    self.push(&mut state, slide);
                }
                PlannedSlide::Title(block) => {
                    let slide = title_slide(block);
                    self.push(&mut state, slide);
                }
                PlannedSlide::Divider { category } => {
                    let slide = divider_slide(category);
                    self.push(&mut state, slide);
                }
                PlannedSlide::Product(product) => {
                    let slide = self.product_slide(&mut state, product);
                    self.push(&mut state, slide);
                    for page in self.spec_sheet_slides(&mut state, product) {
                        self.push(&mut state, page);
                    }
                }
            }
        }

        let kinds = state.package.kinds();
        let warnings = state.warnings;
        let bytes = state.package.finish()?;
        log::info!(
            "Deck '{}' ready: {} slides, {} bytes, {} skipped resources",
            plan.file_name,
            kinds.len(),
            bytes.len(),
            warnings.len()
        );

        Ok(AssembledDeck {
            file_name: plan.file_name.clone(),
            bytes,
            kinds,
            warnings,
        })
    }

    /// Append a slide with its footer; the page number is its position.
    fn push(&self, state: &mut RenderState, mut slide: DeckSlide) {
        let number = state.package.slide_count() + 1;
        slide.add_footer(&format!("{}  |  {}", self.config.brand, number));
        state.package.add_slide(slide);
    }

    /// Fetch, decode and store an image once per URL.
    fn media(&self, state: &mut RenderState, url: &str) -> Option<StoredMedia> {
        if let Some(cached) = state.media.get(url) {
            return cached.clone();
        }

        let stored = match self
            .fetcher
            .fetch(url)
            .and_then(|resource| {
                log::debug!(
                    "Fetched {} ({} bytes, {})",
                    url,
                    resource.bytes.len(),
                    resource.content_type.as_deref().unwrap_or("unknown type")
                );
                Picture::from_bytes(resource.bytes)
            }) {
            Ok(picture) => {
                let (width, height) = (picture.width, picture.height);
                let name = state.package.add_media(picture);
                Some(StoredMedia {
                    name,
                    width,
                    height,
                })
            }
            Err(e) => {
                state.warn(format!("Image {} skipped: {}", url, e));
                None
            }
        };

        state.media.insert(url.to_string(), stored.clone());
        stored
    }

    fn full_bleed_slide(&self, state: &mut RenderState, image_url: Option<&str>) -> DeckSlide {
        let mut slide = DeckSlide::new(SlideKind::FullBleedImage);
        if let Some(media) = image_url.and_then(|url| self.media(state, url)) {
            let target = Rect::full_slide();
            let crop = cover_crop(media.width, media.height, target);
            slide.add_picture(&media.name, target, crop, "Cover image");
        }
        slide
    }

    fn product_slide(&self, state: &mut RenderState, product: &ProductSlide) -> DeckSlide {
        let mut slide = DeckSlide::new(SlideKind::Product);

        let region = product_image_region();
        match product.image_url.as_deref().and_then(|url| self.media(state, url)) {
            Some(media) => {
                let fitted = contain_fit(media.width, media.height, region);
                slide.add_picture(&media.name, fitted, Crop::default(), &product.name);
            }
            None => slide.add_text(
                TextBox::new(region)
                    .with_fill(PLACEHOLDER_FILL)
                    .with_anchor(Anchor::Middle)
                    .with_paragraph(
                        Paragraph::new(TextRun::new("No image", 1400).with_color(MUTED))
                            .with_align(Align::Center),
                    ),
            ),
        }

        let mut text = TextBox::new(product_text_region()).with_autofit();
        text.push(
            Paragraph::new(TextRun::new(product.name.as_str(), 2800).bold().with_color(TEXT))
                .with_space_after(600),
        );
        if !product.code.is_empty() {
            text.push(
                Paragraph::new(TextRun::new(format!("SKU: {}", product.code), 1400).with_color(MUTED))
                    .with_space_after(1200),
            );
        }
        if !product.description.is_empty() {
            text.push(
                Paragraph::new(TextRun::new(product.description.as_str(), 1400).with_color(TEXT))
                    .with_space_after(1200),
            );
        }
        for bullet in &product.bullets {
            text.push(
                Paragraph::new(TextRun::new(bullet.as_str(), 1400).with_color(TEXT))
                    .bulleted()
                    .with_space_after(400),
            );
        }
        slide.add_text(text);

        let mut links = Paragraph::default();
        if let Some(ref url) = product.page_url {
            let rel_id = slide.add_hyperlink(url);
            links.push(TextRun::new("Product page", 1200).with_color(LINK).with_link(rel_id));
        }
        if let Some(ref url) = product.pdf_link {
            if !links.runs.is_empty() {
                links.push(TextRun::new("    ", 1200));
            }
            let rel_id = slide.add_hyperlink(url);
            links.push(TextRun::new("Spec sheet (PDF)", 1200).with_color(LINK).with_link(rel_id));
        }
        if !links.runs.is_empty() {
            slide.add_text(TextBox::new(product_links_region()).with_paragraph(links));
        }

        slide
    }

    /// One slide per rendered spec-sheet page; empty on any failure.
    fn spec_sheet_slides(&self, state: &mut RenderState, product: &ProductSlide) -> Vec<DeckSlide> {
        let Some(ref url) = product.pdf_fetch_url else {
            return Vec::new();
        };
        if self.config.pdf_max_pages == 0 {
            return Vec::new();
        }

        let pages = self.fetcher.fetch(url).and_then(|resource| {
            self.rasterizer.rasterize(
                &resource.bytes,
                self.config.pdf_max_pages,
                self.config.pdf_render_scale,
            )
        });
        let pages = match pages {
            Ok(pages) => pages,
            Err(e) => {
                state.warn(format!("Spec sheet {} for '{}' skipped: {}", url, product.name, e));
                return Vec::new();
            }
        };

        log::debug!("Rendered {} spec-sheet pages for '{}'", pages.len(), product.name);
        pages
            .into_iter()
            .take(self.config.pdf_max_pages)
            .map(|page| {
                let number = page.number;
                let picture = Picture::from_raster(page);
                let (width, height) = (picture.width, picture.height);
                let name = state.package.add_media(picture);

                let mut slide = DeckSlide::new(SlideKind::SpecSheetPage);
                slide.add_text(TextBox::new(spec_sheet_heading_region()).with_paragraph(
                    Paragraph::new(
                        TextRun::new(
                            format!("{}: spec sheet, page {}", product.name, number),
                            1400,
                        )
                        .bold()
                        .with_color(TEXT),
                    ),
                ));
                let fitted = contain_fit(width, height, spec_sheet_image_region());
                slide.add_picture(
                    &name,
                    fitted,
                    Crop::default(),
                    &format!("{} spec sheet page {}", product.name, number),
                );
                slide
            })
            .collect()
    }
}

fn title_slide(block: &TitleBlock) -> DeckSlide {
    let mut slide = DeckSlide::new(SlideKind::Title).with_background(DARK);

    slide.add_text(
        TextBox::new(Rect::inches(0.8, 1.8, 11.7, 1.4))
            .with_anchor(Anchor::Bottom)
            .with_autofit()
            .with_paragraph(Paragraph::new(
                TextRun::new(block.project_name.as_str(), 4000).bold().with_color(WHITE),
            )),
    );

    slide.add_text(
        TextBox::new(Rect::inches(0.8, 3.3, 11.7, 0.7)).with_paragraph(Paragraph::new(
            TextRun::new(format!("Prepared for: {}", block.client_name), 2000).with_color(WHITE),
        )),
    );

    let mut details = TextBox::new(Rect::inches(0.8, 4.3, 11.7, 1.8));
    for line in [
        format!("Prepared by: {}", block.prepared_by),
        block.contact_line.clone(),
        block.date.clone(),
    ] {
        details.push(
            Paragraph::new(TextRun::new(line, 1400).with_color(WHITE)).with_space_after(400),
        );
    }
    slide.add_text(details);

    slide
}

fn divider_slide(category: &str) -> DeckSlide {
    let mut slide = DeckSlide::new(SlideKind::CategoryDivider).with_background(DARK);
    slide.add_text(
        TextBox::new(Rect::inches(0.8, 2.75, 11.7, 2.0))
            .with_anchor(Anchor::Middle)
            .with_paragraph(
                Paragraph::new(TextRun::new(category, 4400).bold().with_color(WHITE))
                    .with_align(Align::Center),
            ),
    );
    slide
}
