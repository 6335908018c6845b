//! PowerPoint (Office Open XML) backend for proposal decks.
//!
//! [`DeckAssembler`] renders a planned deck into a `.pptx` package;
//! [`DeckReader`] reads one back for inspection.

pub mod assembler;
pub mod layout;
pub mod media;
pub mod package;
pub mod reader;
pub mod shapes;
pub mod slide;
mod templates;

pub use assembler::{AssembledDeck, DeckAssembler};
pub use media::{MediaFormat, Picture};
pub use package::PackageWriter;
pub use reader::{DeckReader, InspectedDeck, InspectedSlide};
pub use slide::DeckSlide;
