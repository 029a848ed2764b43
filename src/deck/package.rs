//! Serialization of a [`Presentation`] into a `.pptx` package.
//!
//! Package layout:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/core.xml, docProps/app.xml
//! ppt/presentation.xml (+ _rels)
//! ppt/slideMasters/slideMaster1.xml (+ _rels)
//! ppt/slideLayouts/slideLayout1.xml (+ _rels)
//! ppt/theme/theme1.xml
//! ppt/presProps.xml, ppt/viewProps.xml, ppt/tableStyles.xml
//! ppt/slides/slide{n}.xml (+ _rels)        one per slide
//! ppt/media/image{n}.{png,jpeg}            one per picture
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{self, Cursor, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::presentation::{Picture, PictureData, Presentation, Slide};
use super::templates::{self, content_type as ct, rel};
use crate::error::DeckError;

/// Slide IDs start here; lower values are reserved.
const FIRST_SLIDE_ID: u32 = 256;

/// Relationship IDs in presentation.xml.rels: rId1 is the master, slides follow.
const FIRST_SLIDE_REL: usize = 2;

/// Escape text for use in XML attribute values and character data.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            // Control characters other than tab/newline are not allowed in XML 1.0.
            c if c.is_control() && c != '\t' && c != '\n' && c != '\r' => {}
            _ => result.push(c),
        }
    }
    result
}

impl Presentation {
    /// Serialize the presentation into an in-memory `.pptx` archive.
    pub fn to_bytes(&self) -> Result<Bytes, DeckError> {
        let mut writer = PackageWriter::new();

        writer.add_xml("[Content_Types].xml", &self.content_types_xml()?)?;
        writer.add_xml("_rels/.rels", &package_rels_xml()?)?;
        writer.add_xml("docProps/core.xml", templates::CORE_PROPERTIES)?;
        writer.add_xml("docProps/app.xml", &self.app_xml()?)?;

        writer.add_xml("ppt/presentation.xml", &self.presentation_xml()?)?;
        writer.add_xml(
            "ppt/_rels/presentation.xml.rels",
            &self.presentation_rels_xml()?,
        )?;
        writer.add_xml("ppt/slideMasters/slideMaster1.xml", templates::SLIDE_MASTER)?;
        writer.add_xml(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            templates::SLIDE_MASTER_RELS,
        )?;
        writer.add_xml("ppt/slideLayouts/slideLayout1.xml", templates::SLIDE_LAYOUT)?;
        writer.add_xml(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            templates::SLIDE_LAYOUT_RELS,
        )?;
        writer.add_xml("ppt/theme/theme1.xml", templates::THEME)?;
        writer.add_xml("ppt/presProps.xml", templates::PRES_PROPS)?;
        writer.add_xml("ppt/viewProps.xml", templates::VIEW_PROPS)?;
        writer.add_xml("ppt/tableStyles.xml", templates::TABLE_STYLES)?;

        let mut media_index = 0;
        for (index, slide) in self.slides.iter().enumerate() {
            let number = index + 1;
            let first_media = media_index + 1;

            writer.add_xml(
                &format!("ppt/slides/slide{}.xml", number),
                &slide_xml(slide)?,
            )?;
            writer.add_xml(
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                &slide_rels_xml(slide, first_media)?,
            )?;

            for picture in &slide.pictures {
                media_index += 1;
                writer.add_media(&media_name(media_index, picture), picture)?;
            }
        }

        writer.finish()
    }

    fn content_types_xml(&self) -> Result<String, DeckError> {
        let mut xml = String::with_capacity(2048);
        xml.push_str(templates::XML_HEADER);
        write!(xml, r#"<Types xmlns="{}">"#, templates::NS_CONTENT_TYPES)?;
        write!(
            xml,
            r#"<Default Extension="rels" ContentType="{}"/>"#,
            ct::RELATIONSHIPS
        )?;
        write!(xml, r#"<Default Extension="xml" ContentType="{}"/>"#, ct::XML)?;

        let formats: BTreeSet<_> = self
            .slides
            .iter()
            .flat_map(|slide| slide.pictures.iter().map(|p| p.format))
            .collect();
        for format in formats {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            )?;
        }

        let overrides = [
            ("/ppt/presentation.xml", ct::PRESENTATION),
            ("/ppt/slideMasters/slideMaster1.xml", ct::SLIDE_MASTER),
            ("/ppt/slideLayouts/slideLayout1.xml", ct::SLIDE_LAYOUT),
            ("/ppt/theme/theme1.xml", ct::THEME),
            ("/ppt/presProps.xml", ct::PRES_PROPS),
            ("/ppt/viewProps.xml", ct::VIEW_PROPS),
            ("/ppt/tableStyles.xml", ct::TABLE_STYLES),
            ("/docProps/core.xml", ct::CORE_PROPERTIES),
            ("/docProps/app.xml", ct::EXTENDED_PROPERTIES),
        ];
        for (part, content_type) in overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                part, content_type
            )?;
        }
        for number in 1..=self.slides.len() {
            write!(
                xml,
                r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
                number,
                ct::SLIDE
            )?;
        }

        xml.push_str("</Types>");
        Ok(xml)
    }

    fn app_xml(&self) -> Result<String, DeckError> {
        let mut xml = String::with_capacity(512);
        xml.push_str(templates::XML_HEADER);
        xml.push_str(concat!(
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
        ));
        xml.push_str("<Application>deck-builder</Application>");
        write!(xml, "<Slides>{}</Slides>", self.slides.len())?;
        xml.push_str("</Properties>");
        Ok(xml)
    }

    fn presentation_xml(&self) -> Result<String, DeckError> {
        let mut xml = String::with_capacity(1024 + self.slides.len() * 48);
        xml.push_str(templates::XML_HEADER);
        write!(
            xml,
            r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            templates::NS_A,
            templates::NS_R,
            templates::NS_P
        )?;

        xml.push_str("<p:sldMasterIdLst>");
        xml.push_str(r#"<p:sldMasterId id="2147483648" r:id="rId1"/>"#);
        xml.push_str("</p:sldMasterIdLst>");

        // An empty sldIdLst is invalid, so it is omitted for slide-less decks.
        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for index in 0..self.slides.len() {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                    FIRST_SLIDE_ID + index as u32,
                    FIRST_SLIDE_REL + index
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width(),
            self.slide_height()
        )?;
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        Ok(xml)
    }

    fn presentation_rels_xml(&self) -> Result<String, DeckError> {
        let mut rels = RelationshipsXml::new();
        rels.push("rId1", rel::SLIDE_MASTER, "slideMasters/slideMaster1.xml")?;
        for index in 0..self.slides.len() {
            rels.push(
                &format!("rId{}", FIRST_SLIDE_REL + index),
                rel::SLIDE,
                &format!("slides/slide{}.xml", index + 1),
            )?;
        }

        let next = FIRST_SLIDE_REL + self.slides.len();
        rels.push(&format!("rId{}", next), rel::PRES_PROPS, "presProps.xml")?;
        rels.push(&format!("rId{}", next + 1), rel::VIEW_PROPS, "viewProps.xml")?;
        rels.push(&format!("rId{}", next + 2), rel::THEME, "theme/theme1.xml")?;
        rels.push(
            &format!("rId{}", next + 3),
            rel::TABLE_STYLES,
            "tableStyles.xml",
        )?;
        Ok(rels.finish())
    }
}

fn package_rels_xml() -> Result<String, DeckError> {
    let mut rels = RelationshipsXml::new();
    rels.push("rId1", rel::OFFICE_DOCUMENT, "ppt/presentation.xml")?;
    rels.push("rId2", rel::CORE_PROPERTIES, "docProps/core.xml")?;
    rels.push("rId3", rel::EXTENDED_PROPERTIES, "docProps/app.xml")?;
    Ok(rels.finish())
}

fn media_name(index: usize, picture: &Picture) -> String {
    format!("image{}.{}", index, picture.format.extension())
}

fn slide_xml(slide: &Slide) -> Result<String, DeckError> {
    let mut xml = String::with_capacity(1024 + slide.pictures.len() * 512);
    xml.push_str(templates::XML_HEADER);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        templates::NS_A,
        templates::NS_R,
        templates::NS_P
    )?;
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(templates::SP_TREE_ROOT);

    for (index, picture) in slide.pictures.iter().enumerate() {
        // Shape id 1 is the tree root; rId1 is the layout.
        let shape_id = index + 2;
        let rel_id = index + 2;

        xml.push_str("<p:pic><p:nvPicPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
            shape_id,
            index + 1,
            escape_xml(&picture.name)
        )?;
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
        xml.push_str("</p:nvPicPr>");

        xml.push_str("<p:blipFill>");
        write!(xml, r#"<a:blip r:embed="rId{}"/>"#, rel_id)?;
        xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
        xml.push_str("</p:blipFill>");

        xml.push_str("<p:spPr><a:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, picture.left, picture.top)?;
        write!(
            xml,
            r#"<a:ext cx="{}" cy="{}"/>"#,
            picture.width, picture.height
        )?;
        xml.push_str("</a:xfrm>");
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr></p:pic>");
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    Ok(xml)
}

fn slide_rels_xml(slide: &Slide, first_media: usize) -> Result<String, DeckError> {
    let mut rels = RelationshipsXml::new();
    rels.push(
        "rId1",
        rel::SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml",
    )?;
    for (index, picture) in slide.pictures.iter().enumerate() {
        rels.push(
            &format!("rId{}", index + 2),
            rel::IMAGE,
            &format!("../media/{}", media_name(first_media + index, picture)),
        )?;
    }
    Ok(rels.finish())
}

/// Builder for a `.rels` part.
struct RelationshipsXml {
    xml: String,
}

impl RelationshipsXml {
    fn new() -> Self {
        let mut xml = String::with_capacity(512);
        xml.push_str(templates::XML_HEADER);
        xml.push_str(r#"<Relationships xmlns=""#);
        xml.push_str(templates::NS_RELS);
        xml.push_str(r#"">"#);
        Self { xml }
    }

    fn push(&mut self, id: &str, rel_type: &str, target: &str) -> Result<(), DeckError> {
        write!(
            self.xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id,
            rel_type,
            escape_xml(target)
        )?;
        Ok(())
    }

    fn finish(mut self) -> String {
        self.xml.push_str("</Relationships>");
        self.xml
    }
}

/// Thin wrapper over [`ZipWriter`] mapping errors into [`DeckError`].
struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add_xml(&mut self, name: &str, xml: &str) -> Result<(), DeckError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.write_entry(name, xml.as_bytes(), options)
    }

    /// PNG and JPEG data is already compressed, so media is stored as is.
    ///
    /// File-backed pictures are copied straight from disk into the archive.
    fn add_media(&mut self, file_name: &str, picture: &Picture) -> Result<(), DeckError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let name = format!("ppt/media/{}", file_name);

        match &picture.data {
            PictureData::Memory(data) => self.write_entry(&name, data, options),
            PictureData::File(path) => {
                let picture_error = |e: io::Error| DeckError::Picture {
                    file: picture.name.clone(),
                    message: e.to_string(),
                };

                let mut source = File::open(path).map_err(picture_error)?;
                self.zip.start_file(name, options)?;
                io::copy(&mut source, &mut self.zip).map_err(picture_error)?;
                Ok(())
            }
        }
    }

    fn write_entry(
        &mut self,
        name: &str,
        data: &[u8],
        options: SimpleFileOptions,
    ) -> Result<(), DeckError> {
        self.zip.start_file(name, options)?;
        self.zip
            .write_all(data)
            .map_err(|e| DeckError::Package(e.to_string()))
    }

    fn finish(self) -> Result<Bytes, DeckError> {
        let cursor = self.zip.finish()?;
        Ok(Bytes::from(cursor.into_inner()))
    }
}

// =============================================================================
// Tests
// =============================================================================
