//! OPC package assembly: slides, media and static parts into one ZIP.

use crate::media::Picture;
use crate::slide::DeckSlide;
use crate::templates;
use deck_core::{Error, Result, SlideKind};
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Collects slides and media, then serializes the `.pptx` archive.
#[derive(Debug, Default)]
pub struct PackageWriter {
    title: String,
    creator: String,
    slides: Vec<DeckSlide>,
    media: Vec<(String, Vec<u8>)>,
}

impl PackageWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Store a picture as `ppt/media/image{n}.{ext}` and return the part's file name.
    pub fn add_media(&mut self, picture: Picture) -> String {
        let name = format!("image{}.{}", self.media.len() + 1, picture.format.extension());
        self.media.push((name.clone(), picture.bytes));
        name
    }

    pub fn add_slide(&mut self, slide: DeckSlide) {
        self.slides.push(slide);
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    pub fn kinds(&self) -> Vec<SlideKind> {
        self.slides.iter().map(DeckSlide::kind).collect()
    }

    /// Serialize everything into an in-memory archive.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let xml_options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let media_options = FileOptions::default().compression_method(CompressionMethod::Stored);
        let count = self.slides.len();

        write_part(&mut zip, "[Content_Types].xml", &templates::content_types_xml(count)?, xml_options)?;
        write_part(&mut zip, "_rels/.rels", &templates::root_rels_xml()?, xml_options)?;
        write_part(
            &mut zip,
            "docProps/core.xml",
            &templates::core_props_xml(&self.title, &self.creator)?,
            xml_options,
        )?;
        write_part(&mut zip, "docProps/app.xml", &templates::app_props_xml(count)?, xml_options)?;

        write_part(&mut zip, "ppt/presentation.xml", &templates::presentation_xml(count)?, xml_options)?;
        write_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &templates::presentation_rels_xml(count)?,
            xml_options,
        )?;
        write_part(&mut zip, "ppt/presProps.xml", &templates::pres_props_xml()?, xml_options)?;
        write_part(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml",
            &templates::slide_master_xml()?,
            xml_options,
        )?;
        write_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &templates::slide_master_rels_xml()?,
            xml_options,
        )?;
        write_part(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml",
            &templates::slide_layout_xml()?,
            xml_options,
        )?;
        write_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &templates::slide_layout_rels_xml()?,
            xml_options,
        )?;
        write_part(&mut zip, "ppt/theme/theme1.xml", &templates::theme_xml()?, xml_options)?;

        for (idx, slide) in self.slides.iter().enumerate() {
            let number = idx + 1;
            write_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", number),
                &slide.to_xml()?,
                xml_options,
            )?;
            write_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &slide.rels_xml()?,
                xml_options,
            )?;
        }

        for (name, bytes) in &self.media {
            write_bytes(&mut zip, &format!("ppt/media/{}", name), bytes, media_options)?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))?;
        log::debug!(
            "Wrote package with {} slides and {} media parts",
            count,
            self.media.len()
        );
        Ok(cursor.into_inner())
    }
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    xml: &str,
    options: FileOptions,
) -> Result<()> {
    write_bytes(zip, path, xml.as_bytes(), options)
}

fn write_bytes<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    bytes: &[u8],
    options: FileOptions,
) -> Result<()> {
    zip.start_file(path, options)
        .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
    zip.write_all(bytes)?;
    Ok(())
}
