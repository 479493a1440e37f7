//! services/api/src/adapters/summarize_llm.rs
//!
//! This module contains the adapter for the document-summarizing LLM.
//! It implements the `SummarizationService` port from the `core` crate.
//!
//! The PDF travels inline as a chat `file` content part whose `file_data` is the
//! data URI, so the request body is built by hand and sent through the
//! bring-your-own-types entry point of the client.

use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use docqa_core::ports::{PortError, PortResult, SummarizationService, SummaryRequest, SummaryResponse};
use serde_json::{json, Value};

use crate::adapters::reply::{first_choice_content, parse_json_reply};

const SUMMARY_INSTRUCTIONS: &str = "You are a document summarization assistant. Read the attached PDF and write a concise summary of its main points in a few short paragraphs. Reply with a single JSON object and nothing else: {\"summary\": \"<your summary>\"}";

const ATTACHMENT_NAME: &str = "document.pdf";

/// An adapter that implements `SummarizationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// The chat-completion body carrying the document as a file part.
    pub fn request_body(&self, request: &SummaryRequest<'_>) -> Value {
        json!({
            "model": self.model,
            "n": 1,
            "messages": [
                { "role": "system", "content": SUMMARY_INSTRUCTIONS },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "Summarize this document." },
                        {
                            "type": "file",
                            "file": {
                                "filename": ATTACHMENT_NAME,
                                "file_data": request.document_data_uri,
                            }
                        }
                    ]
                }
            ]
        })
    }
}

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> PortResult<SummaryResponse> {
        let body = self.request_body(request);

        let response: Value = self
            .client
            .chat()
            .create_byot(body)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = first_choice_content(&response)?;
        parse_json_reply(content)
    }
}
