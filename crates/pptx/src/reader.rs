//! Read-back of generated decks.
//!
//! Walks a `.pptx` in presentation order and reports what each slide holds:
//! its kind (stored as the `cSld` name), text per shape, pictures and
//! external links.

use deck_core::{Error, Result, SlideKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

/// What one slide contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectedSlide {
    /// 1-based position in the deck.
    pub number: usize,
    pub kind: Option<SlideKind>,
    /// Text of each shape, paragraphs joined with `\n`.
    pub texts: Vec<String>,
    pub pictures: usize,
    pub hyperlinks: usize,
}

impl InspectedSlide {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.contains(needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectedDeck {
    pub slides: Vec<InspectedSlide>,
}

impl InspectedDeck {
    pub fn kinds(&self) -> Vec<Option<SlideKind>> {
        self.slides.iter().map(|s| s.kind).collect()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Reader for decks written by [`crate::DeckAssembler`].
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<InspectedDeck> {
        self.read(Cursor::new(bytes))
    }

    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<InspectedDeck> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut deck = InspectedDeck::default();
        for (idx, slide_path) in self.slide_order(&mut archive)?.iter().enumerate() {
            deck.slides.push(self.read_slide(&mut archive, slide_path, idx + 1)?);
        }
        Ok(deck)
    }

    /// Slide part paths ordered by their relationship id.
    fn slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let content = read_part(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        for rel in parse_relationships(&content)? {
            if rel.rel_type.ends_with("/slide") {
                let order = trailing_number(&rel.id).or_else(|| trailing_number(&rel.target));
                let path = match rel.target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("ppt/{}", rel.target),
                };
                slides.push((path, order));
            }
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn read_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<InspectedSlide> {
        let content = read_part(archive, slide_path)?;
        let mut slide = self.parse_slide_xml(&content)?;
        slide.number = number;

        let rels_path = rels_path_for(slide_path);
        if let Ok(rels) = read_part(archive, &rels_path) {
            slide.hyperlinks = parse_relationships(&rels)?
                .iter()
                .filter(|r| r.rel_type.ends_with("/hyperlink") && r.external)
                .count();
        }

        Ok(slide)
    }

    fn parse_slide_xml(&self, xml: &str) -> Result<InspectedSlide> {
        let mut slide = InspectedSlide::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut in_shape = false;
        let mut in_paragraph = false;
        let mut current = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"cSld" => slide.kind = attribute(e, b"name").and_then(|n| SlideKind::from_name(&n)),
                    b"sp" => {
                        in_shape = true;
                        current.clear();
                    }
                    b"pic" => slide.pictures += 1,
                    b"p" if in_shape => {
                        in_paragraph = true;
                        if !current.is_empty() {
                            current.push('\n');
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_paragraph => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Bad slide text: {}", e)))?;
                    current.push_str(&text);
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => {
                        let text = current.trim();
                        if !text.is_empty() {
                            slide.texts.push(text.to_string());
                        }
                        current.clear();
                        in_shape = false;
                        in_paragraph = false;
                    }
                    b"p" => in_paragraph = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlError(format!("Error parsing slide: {}", e))),
                _ => {}
            }
        }

        Ok(slide)
    }
}

impl Default for DeckReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
    external: bool,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut rels = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                rels.push(Relationship {
                    id: attribute(e, b"Id").unwrap_or_default(),
                    rel_type: attribute(e, b"Type").unwrap_or_default(),
                    target: attribute(e, b"Target").unwrap_or_default(),
                    external: attribute(e, b"TargetMode").as_deref() == Some("External"),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(rels)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// `ppt/slides/slide3.xml` -> `ppt/slides/_rels/slide3.xml.rels`.
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Strip a namespace prefix from an element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Number at the end of "rId2" or "slide3.xml".
fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    s[start..].parse().ok()
}
