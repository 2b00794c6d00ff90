//! Plain-text recovery from uploaded files.
//!
//! Extraction is best-effort per the upload endpoint's contract: a readable
//! file yields whatever text it carries (possibly empty, e.g. a scanned-image
//! PDF), an unreadable Word container yields the empty string, and only a
//! failing PDF parse is reported as a processing error.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File formats the upload endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Word,
    Text,
}

impl FileKind {
    /// Detect the format from the filename extension first, falling back to
    /// the declared MIME type. Returns `None` for anything unsupported.
    pub fn detect(file_name: &str, content_type: &str) -> Option<Self> {
        let name = file_name.to_lowercase();

        if name.ends_with(".pdf") || content_type == "application/pdf" {
            return Some(FileKind::Pdf);
        }
        if name.ends_with(".docx")
            || name.ends_with(".doc")
            || content_type == DOCX_MIME
            || content_type == "application/msword"
        {
            return Some(FileKind::Word);
        }
        if [".txt", ".md", ".csv", ".rtf"]
            .iter()
            .any(|ext| name.ends_with(ext))
            || content_type.starts_with("text/")
        {
            return Some(FileKind::Text);
        }
        None
    }
}

/// Extract plain text from `bytes` according to the detected format.
pub fn extract_text(kind: FileKind, bytes: &[u8]) -> Result<String> {
    match kind {
        FileKind::Pdf => pdf_extract::extract_text_from_mem(bytes).context("could not read PDF"),
        FileKind::Word => Ok(extract_docx(bytes)),
        FileKind::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Pull the document body out of a DOCX container. Anything that is not a
/// readable DOCX (including legacy binary `.doc` files) yields an empty
/// string, which the endpoint reports as an empty extraction.
fn extract_docx(bytes: &[u8]) -> String {
    let reader = std::io::Cursor::new(bytes);
    let mut archive = match zip::ZipArchive::new(reader) {
        Ok(archive) => archive,
        Err(_) => return String::new(),
    };

    let mut xml = String::new();
    match archive.by_name("word/document.xml") {
        Ok(mut file) => {
            if file.read_to_string(&mut xml).is_err() {
                return String::new();
            }
        }
        Err(_) => return String::new(),
    }

    strip_document_xml(&xml)
}

/// Reduce WordprocessingML to plain text: paragraph ends become newlines,
/// tags are dropped, the five XML entities are decoded.
fn strip_document_xml(xml: &str) -> String {
    static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

    let with_breaks = xml.replace("</w:p>", "\n");
    let text = TAG.replace_all(&with_breaks, "");

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
