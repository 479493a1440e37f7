//! crates/docqa_core/src/data_uri.rs
//!
//! Encodes raw file bytes as a `data:<mime>;base64,<payload>` string for
//! transmission to the summarization collaborator.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Encodes `bytes` as a data URI. Total for any input.
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PDF_MIME_TYPE;

    fn payload(uri: &str) -> &str {
        uri.split_once(";base64,").map(|(_, p)| p).unwrap()
    }

    #[test]
    fn test_prefix_and_round_trip() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(1031).collect();
        let uri = encode(&bytes, PDF_MIME_TYPE);

        assert!(uri.starts_with("data:application/pdf;base64,"));
        assert!(payload(&uri)
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
        assert_eq!(STANDARD.decode(payload(&uri)).unwrap(), bytes);
    }

    #[test]
    fn test_empty_input_has_empty_payload() {
        assert_eq!(encode(&[], PDF_MIME_TYPE), "data:application/pdf;base64,");
    }

    #[test]
    fn test_known_value() {
        assert_eq!(encode(b"%PDF", "application/pdf"), "data:application/pdf;base64,JVBERg==");
        assert_eq!(encode(b"abc", "text/plain"), "data:text/plain;base64,YWJj");
    }
}
