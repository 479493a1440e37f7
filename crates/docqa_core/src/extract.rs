//! crates/docqa_core/src/extract.rs
//!
//! Plain-text extraction from PDF bytes.
//!
//! Pages are visited in increasing page-number order. On each page the text
//! fragments drawn by the content stream (`Tj`, `TJ`, `'`, `"`) are joined
//! with single spaces, and every page is terminated with `\n`. A document
//! with three pages reading "Hello", "World" and "!" therefore extracts to
//! `"Hello\nWorld\n!\n"`.
//!
//! String operands are decoded through the encoding of the font selected by
//! the most recent `Tf`, as declared in the page's font resources.
//!
//! The extractor does not judge whether the result is usable. A scanned PDF
//! with no text layer extracts to a string of newlines; the session decides
//! what to do with that.

use bytes::Bytes;
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{DocQaError, DocQaResult};

/// Separator written after each page's text.
pub const PAGE_SEPARATOR: char = '\n';

/// Extracts the concatenated text of every page.
pub fn extract_text(bytes: &[u8]) -> DocQaResult<String> {
    let doc = Document::load_mem(bytes).map_err(|e| DocQaError::MalformedDocument(e.to_string()))?;

    // `get_pages` is keyed by 1-based page number, so iteration is in page order.
    let pages = doc.get_pages();
    let mut full_text = String::new();

    for (page_number, page_id) in &pages {
        let fragments = page_fragments(&doc, *page_id).map_err(|e| {
            DocQaError::MalformedDocument(format!("page {}: {}", page_number, e))
        })?;
        full_text.push_str(&fragments.join(" "));
        full_text.push(PAGE_SEPARATOR);
    }

    debug!(
        "Extracted {} characters from {} pages.",
        full_text.len(),
        pages.len()
    );
    Ok(full_text)
}

/// Extracts text on the blocking pool.
pub async fn extract_in_background(bytes: Bytes) -> DocQaResult<String> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| DocQaError::MalformedDocument(format!("extraction task failed: {}", e)))?
}

/// The text fragments shown on one page, in content-stream order.
fn page_fragments(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, &str> = doc
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect();
    let raw = doc.get_page_content(page_id)?;
    let content = Content::decode(&raw)?;

    let mut encoding: Option<&str> = None;
    let mut fragments = Vec::new();
    for operation in &content.operations {
        let shown = match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name).copied());
                None
            }
            "Tj" | "'" => operation.operands.first().and_then(|o| string_operand(o, encoding)),
            "\"" => operation.operands.get(2).and_then(|o| string_operand(o, encoding)),
            "TJ" => match operation.operands.first() {
                // Numbers in the array are kerning adjustments, only strings carry text.
                Some(Object::Array(items)) => {
                    let joined: String = items
                        .iter()
                        .filter_map(|item| string_operand(item, encoding))
                        .collect();
                    Some(joined)
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(text) = shown {
            if !text.is_empty() {
                fragments.push(text);
            }
        }
    }
    Ok(fragments)
}

fn string_operand(object: &Object, encoding: Option<&str>) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes, encoding)),
        _ => None,
    }
}

/// Decodes a shown string: UTF-16BE when it carries a byte-order mark,
/// otherwise through the font's simple encoding.
fn decode_pdf_string(bytes: &[u8], encoding: Option<&str>) -> String {
    if let Some(utf16) = bytes.strip_prefix(b"\xFE\xFF") {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    Document::decode_text(encoding, bytes)
}
