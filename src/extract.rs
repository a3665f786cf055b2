//! Plain-text reading of source files for import.
//!
//! `.txt` and `.md` are read as UTF-8; `.pdf` goes through `pdf-extract`;
//! `.docx` is unzipped and its `w:t` runs collected with `quick-xml`.
//! Anything else is rejected.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

/// Maximum decompressed bytes read from a ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("file is not valid UTF-8 text")]
    NotUtf8,
}

/// Supported source formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Text,
    Pdf,
    Docx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "md" => Ok(SourceFormat::Text),
            "pdf" => Ok(SourceFormat::Pdf),
            "docx" => Ok(SourceFormat::Docx),
            "" => Err(ExtractError::UnsupportedFileType(
                "(no extension)".to_string(),
            )),
            other => Err(ExtractError::UnsupportedFileType(format!(".{}", other))),
        }
    }
}

/// Read `path` and return its text content.
pub fn read_source_text(path: &Path) -> Result<String> {
    let format = SourceFormat::from_path(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = extract_text(&bytes, format)
        .with_context(|| format!("Failed to extract text from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        chars = text.chars().count(),
        "extracted source text"
    );
    Ok(text)
}

pub fn extract_text(bytes: &[u8], format: SourceFormat) -> Result<String, ExtractError> {
    match format {
        SourceFormat::Text => String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::NotUtf8),
        SourceFormat::Pdf => extract_pdf(bytes),
        SourceFormat::Docx => extract_docx(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractError::Docx("word/document.xml not found".to_string()))?;
    let mut xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    docx_paragraph_text(&xml)
}

/// Text of every `w:t` run, one line per `w:p` paragraph.
fn docx_paragraph_text(xml: &[u8]) -> Result<String, ExtractError> {
    use quick_xml::events::Event;

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let line = std::mem::take(&mut current);
                    if !line.trim().is_empty() {
                        paragraphs.push(line);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}
