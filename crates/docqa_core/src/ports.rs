//! crates/docqa_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the hosted language-model
//! collaborators. These traits form the boundary of the hexagonal architecture,
//! allowing the core to stay independent of any specific model provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Turn;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, provider SDK).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The collaborator replied, but the payload did not have the expected shape.
    #[error("Invalid response from collaborator: {0}")]
    InvalidResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Request / Response Payloads
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest<'a> {
    pub document_data_uri: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Everything the answering collaborator needs for one stateless call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest<'a> {
    pub document_text: &'a str,
    pub question: &'a str,
    /// Resolved turns, oldest first. Never contains the question being asked.
    pub conversation_history: &'a [Turn],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Produces a summary of the document carried by the data URI.
    async fn summarize(&self, request: &SummaryRequest<'_>) -> PortResult<SummaryResponse>;
}

#[async_trait]
pub trait AnsweringService: Send + Sync {
    /// Answers a question grounded in the document text and prior turns.
    async fn answer(&self, request: &AnswerRequest<'_>) -> PortResult<AnswerResponse>;
}
