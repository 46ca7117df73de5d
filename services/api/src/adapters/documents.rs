//! services/api/src/adapters/documents.rs
//!
//! Plain-text extraction for uploaded office documents. Images are not handled
//! here; they go to the `OcrService`.

use dyslexia_core::ports::{PortError, PortResult};
use quick_xml::{events::Event, Reader as XmlReader};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";

/// How an upload should be turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Pdf,
    Image,
}

impl DocumentKind {
    /// Picks the extraction route from the declared MIME type or, failing
    /// that, the file extension. Unknown types are rejected.
    pub fn detect(file_name: &str, file_type: Option<&str>) -> Option<Self> {
        let name = file_name.to_ascii_lowercase();
        let mime = file_type.unwrap_or_default().to_ascii_lowercase();

        if mime == DOCX_MIME || name.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if mime == PDF_MIME || name.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if mime.starts_with("image/")
            || [".png", ".jpg", ".jpeg", ".webp"].iter().any(|ext| name.ends_with(ext))
        {
            Some(DocumentKind::Image)
        } else {
            None
        }
    }

    /// The content type to forward to the OCR service for images.
    pub fn image_content_type(file_name: &str, file_type: Option<&str>) -> String {
        if let Some(mime) = file_type.filter(|m| m.starts_with("image/")) {
            return mime.to_string();
        }
        let name = file_name.to_ascii_lowercase();
        if name.ends_with(".jpg") || name.ends_with(".jpeg") {
            "image/jpeg".to_string()
        } else if name.ends_with(".webp") {
            "image/webp".to_string()
        } else {
            "image/png".to_string()
        }
    }
}

/// Extracts text from a DOCX or PDF payload. CPU bound; call from a blocking task.
pub fn extract_text(kind: DocumentKind, data: &[u8]) -> PortResult<String> {
    match kind {
        DocumentKind::Docx => extract_docx_text(data),
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(data)
            .map(|text| text.trim().to_string())
            .map_err(|e| PortError::InvalidInput(format!("failed to extract PDF text: {}", e))),
        DocumentKind::Image => Err(PortError::Unexpected(
            "images must be sent to the OCR service".to_string(),
        )),
    }
}

fn extract_docx_text(data: &[u8]) -> PortResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| PortError::InvalidInput(format!("failed to open DOCX archive: {}", e)))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|_| PortError::InvalidInput("missing word/document.xml in DOCX".to_string()))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| PortError::InvalidInput(format!("failed to read DOCX XML: {}", e)))?;

    docx_xml_to_text(&xml)
}

/// Collects the `w:t` runs of a WordprocessingML body, one line per paragraph.
pub fn docx_xml_to_text(xml: &str) -> PortResult<String> {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e
                        .unescape()
                        .map_err(|err| PortError::InvalidInput(err.to_string()))?;
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(PortError::InvalidInput(format!("failed to parse DOCX XML: {}", err)))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(output.trim().to_string())
}
