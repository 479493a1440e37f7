//! crates/docqa_core/src/conversation.rs
//!
//! The visible conversation for one loaded document.
//!
//! Each question is an entry with its own `Pending -> Answered | Failed`
//! status, so resolving an answer never depends on list positions. The flat
//! role-tagged history is still produced on demand, and the transcript is
//! derived from it.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{ChatMessage, HistoryMessage, QuestionEntry, QuestionStatus, Transcript};
use crate::error::{DocQaError, DocQaResult};
use crate::transcript::build_transcript;

/// Text shown above the summary in the first message of a conversation.
pub const SUMMARY_PREFIX: &str = "Here's a quick summary of your document:\n\n";

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Starts a conversation with the document summary as its opening message.
    pub fn with_summary(summary: &str) -> Self {
        Self {
            messages: vec![ChatMessage::SummaryNotice {
                text: format!("{}{}", SUMMARY_PREFIX, summary),
            }],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The question currently awaiting an answer, if any.
    pub fn pending(&self) -> Option<&QuestionEntry> {
        self.questions()
            .find(|entry| entry.status == QuestionStatus::Pending)
    }

    /// Records a new question as pending.
    ///
    /// Only one question may be outstanding; a second one is rejected.
    pub fn begin_question(&mut self, question: impl Into<String>) -> DocQaResult<Uuid> {
        if self.pending().is_some() {
            return Err(DocQaError::QuestionInFlight);
        }
        let id = Uuid::new_v4();
        self.messages.push(ChatMessage::Question(QuestionEntry {
            id,
            question: question.into(),
            status: QuestionStatus::Pending,
            asked_at: Utc::now(),
        }));
        Ok(id)
    }

    /// Moves a pending question to `Answered`. Returns false if `id` is not pending.
    pub fn answer(&mut self, id: Uuid, answer: impl Into<String>) -> bool {
        self.resolve(id, QuestionStatus::Answered { answer: answer.into() })
    }

    /// Moves a pending question to `Failed`. Returns false if `id` is not pending.
    pub fn fail(&mut self, id: Uuid, message: impl Into<String>) -> bool {
        self.resolve(id, QuestionStatus::Failed { message: message.into() })
    }

    fn resolve(&mut self, id: Uuid, status: QuestionStatus) -> bool {
        let entry = self.messages.iter_mut().find_map(|message| match message {
            ChatMessage::Question(entry) if entry.id == id => Some(entry),
            _ => None,
        });
        match entry {
            Some(entry) if entry.status == QuestionStatus::Pending => {
                entry.status = status;
                true
            }
            _ => false,
        }
    }

    /// Flattens the conversation into role-tagged messages.
    ///
    /// The summary renders as an assistant message, a failed question as a
    /// lone user message.
    pub fn history(&self) -> Vec<HistoryMessage> {
        let mut history = Vec::with_capacity(self.messages.len() * 2);
        for message in &self.messages {
            match message {
                ChatMessage::SummaryNotice { text } => history.push(HistoryMessage::assistant(text.clone())),
                ChatMessage::Question(entry) => {
                    history.push(HistoryMessage::user(entry.question.clone()));
                    match &entry.status {
                        QuestionStatus::Pending => history.push(HistoryMessage::pending()),
                        QuestionStatus::Answered { answer } => {
                            history.push(HistoryMessage::assistant(answer.clone()))
                        }
                        QuestionStatus::Failed { .. } => {}
                    }
                }
            }
        }
        history
    }

    /// Resolved turns, oldest first. Excludes any pending question.
    pub fn transcript(&self) -> Transcript {
        build_transcript(&self.history())
    }

    fn questions(&self) -> impl Iterator<Item = &QuestionEntry> {
        self.messages.iter().filter_map(|message| match message {
            ChatMessage::Question(entry) => Some(entry),
            ChatMessage::SummaryNotice { .. } => None,
        })
    }
}
