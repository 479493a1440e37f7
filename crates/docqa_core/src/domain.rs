//! crates/docqa_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//! These structs carry no I/O; the serde derives exist so the service layer
//! can hand them to clients unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The MIME type accepted at the upload boundary.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A PDF that has been fully extracted and encoded.
///
/// Created once per upload and never mutated; a reset drops it entirely.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    /// Plain text of every page, in page order, each page terminated by `\n`.
    pub text: String,
    /// `data:application/pdf;base64,...` form of the original bytes.
    pub data_uri: String,
}

/// One resolved question-and-answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
}

/// Resolved turns, oldest first. Always rebuilt from the conversation, never stored.
pub type Transcript = Vec<Turn>;

/// Role tag of a message in the flat chat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    /// The "thinking..." marker shown while an answer is outstanding.
    Pending,
}

/// A single entry of the flat, role-tagged chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }

    pub fn pending() -> Self {
        Self { role: MessageRole::Pending, content: String::new() }
    }
}

/// Lifecycle of a single question: `Pending -> Answered | Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuestionStatus {
    Pending,
    Answered { answer: String },
    Failed { message: String },
}

/// A question asked by the user, together with its current status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionEntry {
    pub id: Uuid,
    pub question: String,
    #[serde(flatten)]
    pub status: QuestionStatus,
    pub asked_at: DateTime<Utc>,
}

/// One item of the visible conversation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatMessage {
    /// The document summary that opens every conversation.
    SummaryNotice { text: String },
    Question(QuestionEntry),
}
