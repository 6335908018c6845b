//! One slide part and its relationships.

use crate::layout::{footer_region, Crop, Rect};
use crate::shapes::{Align, Anchor, Paragraph, PictureShape, Shape, TextBox, TextRun};
use deck_core::{Result, SlideKind};
use quick_xml::escape::escape;
use std::fmt::Write;

pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

const FOOTER_SIZE: u32 = 1000;
const FOOTER_COLOR: &str = "7F7F7F";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SlideRel {
    /// Media part name, e.g. `image3.png`.
    Image(String),
    Hyperlink(String),
}

/// A slide under construction.
///
/// `rId1` always points at the slide layout; pictures and hyperlinks get
/// the following ids in the order they are added.
#[derive(Debug, Clone)]
pub struct DeckSlide {
    kind: SlideKind,
    background: Option<String>,
    shapes: Vec<Shape>,
    rels: Vec<SlideRel>,
}

impl DeckSlide {
    pub fn new(kind: SlideKind) -> Self {
        Self {
            kind,
            background: None,
            shapes: Vec::new(),
            rels: Vec::new(),
        }
    }

    pub fn kind(&self) -> SlideKind {
        self.kind
    }

    pub fn with_background(mut self, color: &str) -> Self {
        self.background = Some(color.to_string());
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    fn push_rel(&mut self, rel: SlideRel) -> String {
        self.rels.push(rel);
        format!("rId{}", self.rels.len() + 1)
    }

    pub fn add_text(&mut self, text: TextBox) {
        self.shapes.push(Shape::Text(text));
    }

    /// Place an already packaged media part.
    pub fn add_picture(&mut self, media_name: &str, rect: Rect, crop: Crop, description: &str) {
        let rel_id = self.push_rel(SlideRel::Image(media_name.to_string()));
        self.shapes.push(Shape::Picture(PictureShape {
            rect,
            rel_id,
            crop,
            description: description.to_string(),
        }));
    }

    /// Register an external hyperlink target and return its relationship id.
    pub fn add_hyperlink(&mut self, url: &str) -> String {
        self.push_rel(SlideRel::Hyperlink(url.to_string()))
    }

    pub fn hyperlink_count(&self) -> usize {
        self.rels
            .iter()
            .filter(|r| matches!(r, SlideRel::Hyperlink(_)))
            .count()
    }

    pub fn picture_count(&self) -> usize {
        self.rels
            .iter()
            .filter(|r| matches!(r, SlideRel::Image(_)))
            .count()
    }

    /// Small right-aligned footer, `text` as given.
    pub fn add_footer(&mut self, text: &str) {
        let footer = TextBox::new(footer_region())
            .with_anchor(Anchor::Bottom)
            .with_paragraph(
                Paragraph::new(TextRun::new(text, FOOTER_SIZE).with_color(FOOTER_COLOR))
                    .with_align(Align::Right),
            );
        self.add_text(footer);
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        xml.push_str(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#);
        xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);

        write!(xml, r#"<p:cSld name="{}">"#, self.kind.as_str())?;

        if let Some(ref color) = self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                color
            )?;
        }

        xml.push_str("<p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#);
        xml.push_str(r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

        for (idx, shape) in self.shapes.iter().enumerate() {
            shape.write_xml(&mut xml, idx + 2)?;
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        Ok(xml)
    }

    pub fn rels_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        write!(
            xml,
            r#"<Relationship Id="rId1" Type="{}" Target="../slideLayouts/slideLayout1.xml"/>"#,
            REL_SLIDE_LAYOUT
        )?;

        for (idx, rel) in self.rels.iter().enumerate() {
            let id = idx + 2;
            match rel {
                SlideRel::Image(name) => write!(
                    xml,
                    r#"<Relationship Id="rId{}" Type="{}" Target="../media/{}"/>"#,
                    id, REL_IMAGE, name
                )?,
                SlideRel::Hyperlink(url) => write!(
                    xml,
                    r#"<Relationship Id="rId{}" Type="{}" Target="{}" TargetMode="External"/>"#,
                    id,
                    REL_HYPERLINK,
                    escape(url.as_str())
                )?,
            }
        }

        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_ids_follow_layout() {
        let mut slide = DeckSlide::new(SlideKind::Product);
        slide.add_picture("image1.png", Rect::full_slide(), Crop::default(), "Lamp");
        let link = slide.add_hyperlink("https://shop.example/lamp?a=1&b=2");
        assert_eq!(link, "rId3");
        assert_eq!(slide.picture_count(), 1);
        assert_eq!(slide.hyperlink_count(), 1);

        let rels = slide.rels_xml().unwrap();
        assert!(rels.contains(r#"Id="rId1""#));
        assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png""#));
        assert!(rels.contains(r#"Target="https://shop.example/lamp?a=1&amp;b=2" TargetMode="External""#));
    }

    #[test]
    fn test_slide_xml_names_kind_and_numbers_shapes() {
        let mut slide = DeckSlide::new(SlideKind::CategoryDivider).with_background("1F2A44");
        slide.add_footer("Brand  |  4");
        let xml = slide.to_xml().unwrap();

        assert!(xml.contains(r#"<p:cSld name="divider">"#));
        assert!(xml.contains(r#"<a:srgbClr val="1F2A44"/>"#));
        assert!(xml.contains(r#"<p:cNvPr id="2" name="TextBox 2"/>"#));
        assert!(xml.contains("<a:t>Brand  |  4</a:t>"));
    }
}
