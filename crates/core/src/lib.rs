//! Core domain types, catalog normalization, image/PDF URL resolution and
//! deck planning for product proposal decks.

pub mod bullets;
pub mod catalog;
pub mod config;
pub mod deck;
pub mod error;
pub mod image_url;
pub mod normalize;
pub mod resources;
pub mod types;

pub use catalog::{parse_sheet_payload, Catalog, SortOrder};
pub use config::{DeckConfig, ProxyEndpoints};
pub use deck::{plan_deck, DeckPlan, PlannedSlide, SlideKind};
pub use error::{Error, Result};
pub use normalize::{HeaderMap, RowNormalizer};
pub use resources::{FetchedResource, Fetcher, PdfRasterizer, RasterPage};
pub use types::{ContactInfo, ExportForm, ProductRecord, ProjectMeta, RawTable, Session};
