//! DrawingML shape serialization.
//!
//! Shapes are written straight into the slide's XML buffer. Positions come
//! from [`crate::layout`]; relationship ids are handed out by the slide.

use crate::layout::{Crop, Rect};
use deck_core::Result;
use quick_xml::escape::escape;
use std::fmt::Write;

/// Hundredths of a point, the unit of `sz`.
pub type FontSize = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn as_attr(&self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// Vertical anchoring of a text body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    fn as_attr(&self) -> &'static str {
        match self {
            Anchor::Top => "t",
            Anchor::Middle => "ctr",
            Anchor::Bottom => "b",
        }
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub size: FontSize,
    pub bold: bool,
    pub color: Option<String>,
    /// Relationship id of an external hyperlink.
    pub link: Option<String>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, size: FontSize) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
            color: None,
            link: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_link(mut self, rel_id: impl Into<String>) -> Self {
        self.link = Some(rel_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub align: Align,
    pub bullet: bool,
    /// Space after the paragraph, in hundredths of a point.
    pub space_after: Option<u32>,
}

impl Paragraph {
    pub fn new(run: TextRun) -> Self {
        Self {
            runs: vec![run],
            ..Default::default()
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn bulleted(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub fn with_space_after(mut self, space: u32) -> Self {
        self.space_after = Some(space);
        self
    }

    pub fn push(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<a:p>");
        write!(xml, r#"<a:pPr algn="{}""#, self.align.as_attr())?;
        if self.bullet {
            xml.push_str(r#" marL="285750" indent="-285750""#);
        }
        xml.push('>');
        if let Some(space) = self.space_after {
            write!(xml, r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#, space)?;
        }
        if self.bullet {
            xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
        } else {
            xml.push_str("<a:buNone/>");
        }
        xml.push_str("</a:pPr>");

        for run in &self.runs {
            write!(xml, r#"<a:r><a:rPr lang="en-US" sz="{}""#, run.size)?;
            if run.bold {
                xml.push_str(r#" b="1""#);
            }
            if run.link.is_some() {
                xml.push_str(r#" u="sng""#);
            }
            xml.push_str(r#" dirty="0">"#);
            if let Some(ref color) = run.color {
                write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
            }
            if let Some(ref rel_id) = run.link {
                write!(xml, r#"<a:hlinkClick r:id="{}"/>"#, rel_id)?;
            }
            xml.push_str("</a:rPr>");
            write!(xml, "<a:t>{}</a:t></a:r>", escape(run.text.as_str()))?;
        }

        xml.push_str("</a:p>");
        Ok(())
    }
}

/// A text box, optionally filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub rect: Rect,
    pub paragraphs: Vec<Paragraph>,
    pub anchor: Anchor,
    pub fill: Option<String>,
    /// Shrink text on overflow.
    pub autofit: bool,
}

impl TextBox {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            paragraphs: Vec::new(),
            anchor: Anchor::Top,
            fill: None,
            autofit: false,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_fill(mut self, color: &str) -> Self {
        self.fill = Some(color.to_string());
        self
    }

    pub fn with_autofit(mut self) -> Self {
        self.autofit = true;
        self
    }

    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }
}

/// An embedded picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureShape {
    pub rect: Rect,
    pub rel_id: String,
    pub crop: Crop,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Text(TextBox),
    Picture(PictureShape),
}

impl Shape {
    pub(crate) fn write_xml(&self, xml: &mut String, id: usize) -> Result<()> {
        match self {
            Shape::Text(text) => write_text_box(xml, id, text),
            Shape::Picture(picture) => write_picture(xml, id, picture),
        }
    }
}

fn write_xfrm(xml: &mut String, rect: &Rect) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )?;
    Ok(())
}

fn write_text_box(xml: &mut String, id: usize, text: &TextBox) -> Result<()> {
    xml.push_str("<p:sp><p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="TextBox {}"/>"#, id, id)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

    xml.push_str("<p:spPr>");
    write_xfrm(xml, &text.rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    match text.fill {
        Some(ref color) => {
            write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?
        }
        None => xml.push_str("<a:noFill/>"),
    }
    xml.push_str("</p:spPr>");

    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="{}">"#,
        text.anchor.as_attr()
    )?;
    xml.push_str(if text.autofit {
        "<a:normAutofit/>"
    } else {
        "<a:noAutofit/>"
    });
    xml.push_str("</a:bodyPr><a:lstStyle/>");

    if text.paragraphs.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in &text.paragraphs {
        paragraph.write_xml(xml)?;
    }

    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn write_picture(xml: &mut String, id: usize, picture: &PictureShape) -> Result<()> {
    xml.push_str("<p:pic><p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        id,
        id,
        escape(picture.description.as_str())
    )?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, picture.rel_id)?;
    let crop = picture.crop;
    if !crop.is_empty() {
        write!(
            xml,
            r#"<a:srcRect l="{}" t="{}" r="{}" b="{}"/>"#,
            crop.left, crop.top, crop.right, crop.bottom
        )?;
    }
    xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, &picture.rect)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect {
            x: 10,
            y: 20,
            cx: 300,
            cy: 400,
        }
    }

    #[test]
    fn test_text_is_escaped() {
        let text = TextBox::new(rect())
            .with_paragraph(Paragraph::new(TextRun::new("Oak & Ash <Ltd>", 1800).bold()));
        let mut xml = String::new();
        Shape::Text(text).write_xml(&mut xml, 2).unwrap();

        assert!(xml.contains("<a:t>Oak &amp; Ash &lt;Ltd&gt;</a:t>"));
        assert!(xml.contains(r#"sz="1800" b="1""#));
        assert!(xml.contains(r#"<a:off x="10" y="20"/>"#));
    }

    #[test]
    fn test_bullet_and_hyperlink_runs() {
        let paragraph = Paragraph::new(TextRun::new("Spec sheet", 1200).with_link("rId4")).bulleted();
        let mut xml = String::new();
        Shape::Text(TextBox::new(rect()).with_paragraph(paragraph))
            .write_xml(&mut xml, 3)
            .unwrap();

        assert!(xml.contains(r#"<a:buChar char="&#8226;"/>"#));
        assert!(xml.contains(r#"<a:hlinkClick r:id="rId4"/>"#));
    }

    #[test]
    fn test_empty_text_box_still_has_a_paragraph() {
        let mut xml = String::new();
        Shape::Text(TextBox::new(rect()).with_fill("EEEEEE"))
            .write_xml(&mut xml, 2)
            .unwrap();
        assert!(xml.contains("<a:endParaRPr"));
        assert!(xml.contains(r#"<a:srgbClr val="EEEEEE"/>"#));
    }

    #[test]
    fn test_picture_crop_written_only_when_set() {
        let mut picture = PictureShape {
            rect: rect(),
            rel_id: "rId2".to_string(),
            crop: Crop::default(),
            description: "Lamp".to_string(),
        };
        let mut xml = String::new();
        Shape::Picture(picture.clone()).write_xml(&mut xml, 2).unwrap();
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(!xml.contains("srcRect"));

        picture.crop = Crop {
            top: 100,
            bottom: 100,
            ..Default::default()
        };
        let mut xml = String::new();
        Shape::Picture(picture).write_xml(&mut xml, 2).unwrap();
        assert!(xml.contains(r#"<a:srcRect l="0" t="100" r="0" b="100"/>"#));
    }
}
