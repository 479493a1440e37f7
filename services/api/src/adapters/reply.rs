//! services/api/src/adapters/reply.rs
//!
//! Shared parsing of the JSON objects the language model is asked to return.

use docqa_core::ports::{PortError, PortResult};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").unwrap())
}

/// Parses a model reply into `T`, unwrapping a surrounding markdown code fence
/// if the model added one.
pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> PortResult<T> {
    let trimmed = raw.trim();
    let body = code_fence()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    serde_json::from_str(body).map_err(|e| {
        PortError::InvalidResponse(format!("expected a JSON object, got {} chars: {}", raw.len(), e))
    })
}

/// Pulls the text of the first choice out of a chat-completion response body.
pub fn first_choice_content(response: &serde_json::Value) -> PortResult<&str> {
    response
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            PortError::InvalidResponse("response contained no message content".to_string())
        })
}
