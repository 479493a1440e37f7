//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for the main Question-Answering LLM.
//! It implements the `AnsweringService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are an AI assistant that answers questions about a document.

Use the document text and the conversation history you are given. Prefer what the
document says; if the document does not cover the question, say so plainly.

Reply with a single JSON object and nothing else:
{"answer": "<your answer>"}"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use docqa_core::ports::{AnswerRequest, AnswerResponse, AnsweringService, PortError, PortResult};
use tracing::debug;

use crate::adapters::reply::parse_json_reply;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnsweringService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQaAdapter {
    /// Creates a new `OpenAiQaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Renders the user prompt: document, then every prior turn oldest first,
    /// then the new question.
    pub fn render_prompt(request: &AnswerRequest<'_>) -> String {
        let history: String = request
            .conversation_history
            .iter()
            .map(|turn| format!("Question: {}\nAnswer: {}\n", turn.question, turn.answer))
            .collect();

        format!(
            "Document Text: {}\n\nConversation History:\n{}\nQuestion: {}\nAnswer:",
            request.document_text, history, request.question
        )
    }
}

//=========================================================================================
// `AnsweringService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnsweringService for OpenAiQaAdapter {
    async fn answer(&self, request: &AnswerRequest<'_>) -> PortResult<AnswerResponse> {
        debug!(
            "Answering question ({} chars) with {} prior turns.",
            request.question.len(),
            request.conversation_history.len()
        );

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::render_prompt(request))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::InvalidResponse("QA LLM response contained no text content.".to_string())
            })?;

        parse_json_reply(&content)
    }
}
