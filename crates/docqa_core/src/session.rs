//! crates/docqa_core/src/session.rs
//!
//! The document session controller: owns the single active document, its
//! summary and its conversation, and drives the
//! `Empty -> Processing -> Ready | Failed` lifecycle.
//!
//! Every upload and every reset bumps a generation counter. Work started
//! under one generation is dropped with `Superseded` if the generation has
//! moved on by the time it completes. The state lock is never held across a
//! collaborator call.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::data_uri;
use crate::domain::{ChatMessage, Document};
use crate::error::{DocQaError, DocQaResult};
use crate::extract;
use crate::ports::{SummarizationService, SummaryRequest};
use crate::qa::QaOrchestrator;
use crate::upload::UploadedFile;

const EVENT_CHANNEL_CAPACITY: usize = 64;

//=========================================================================================
// Session State
//=========================================================================================

/// The document, summary and conversation of a session in `Ready`.
#[derive(Debug, Clone)]
pub struct ReadySession {
    pub document: Arc<Document>,
    pub summary: String,
    pub conversation: Conversation,
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Empty,
    Processing { file_name: String },
    Ready(ReadySession),
    Failed { error: DocQaError },
}

/// A payload-free tag for `SessionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Empty,
    Processing,
    Ready,
    Failed,
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Empty => SessionStatus::Empty,
            SessionState::Processing { .. } => SessionStatus::Processing,
            SessionState::Ready(_) => SessionStatus::Ready,
            SessionState::Failed { .. } => SessionStatus::Failed,
        }
    }
}

/// A point-in-time view of the session for clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub status: SessionStatus,
    pub file_name: Option<String>,
    pub summary: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub turn_count: usize,
    pub error: Option<String>,
}

/// Notifications published to observers on every change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    StateChanged {
        generation: u64,
        status: SessionStatus,
        file_name: Option<String>,
        error: Option<String>,
    },
    QuestionAsked {
        generation: u64,
        id: Uuid,
        question: String,
    },
    QuestionAnswered {
        generation: u64,
        id: Uuid,
        answer: String,
    },
    QuestionFailed {
        generation: u64,
        id: Uuid,
        message: String,
    },
}

/// The result of a successfully answered question.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    pub id: Uuid,
    pub answer: String,
    pub turn_count: usize,
}

struct Inner {
    generation: u64,
    state: SessionState,
}

/// Everything a detached upload or question task needs to reach the session.
struct Shared {
    inner: Mutex<Inner>,
    summarizer: Arc<dyn SummarizationService>,
    qa: QaOrchestrator,
    events: broadcast::Sender<SessionEvent>,
}

//=========================================================================================
// SessionController
//=========================================================================================

/// Owns the single document session.
///
/// Uploads and questions run as spawned tasks that the caller awaits. Dropping
/// the caller's future does not cancel them, so the session always leaves
/// `Processing` and a pending question is always resolved.
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(summarizer: Arc<dyn SummarizationService>, qa: QaOrchestrator) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { generation: 0, state: SessionState::Empty }),
                summarizer,
                qa,
                events,
            }),
        }
    }

    /// Subscribes to session events. Events sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub async fn state(&self) -> SessionState {
        self.shared.inner.lock().await.state.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.shared.inner.lock().await;
        snapshot_of(&inner)
    }

    /// Accepts a PDF, extracts and summarizes it, and moves the session to
    /// `Ready` or `Failed`.
    ///
    /// Non-PDF files are rejected before any state change. Uploads are only
    /// accepted from `Empty` or `Failed`.
    pub async fn submit_file(&self, file: UploadedFile) -> DocQaResult<SessionSnapshot> {
        if !file.is_pdf() {
            warn!("Rejected upload '{}' with type '{}'.", file.file_name, file.mime_type);
            return Err(DocQaError::UnsupportedFileType(file.mime_type));
        }

        let generation = {
            let mut inner = self.shared.inner.lock().await;
            if !matches!(inner.state, SessionState::Empty | SessionState::Failed { .. }) {
                return Err(DocQaError::SessionBusy);
            }
            inner.generation += 1;
            inner.state = SessionState::Processing { file_name: file.file_name.clone() };
            self.shared.publish_state(&inner);
            inner.generation
        };
        info!("Processing upload '{}' (generation {}).", file.file_name, generation);

        let file_name = file.file_name.clone();
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let outcome = shared.process(&file, generation).await;
            shared.finish_upload(generation, &file.file_name, outcome).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                let failure = DocQaError::SummarizationFailed(format!("processing task failed: {}", e));
                self.shared.finish_upload(generation, &file_name, Err(failure)).await
            }
        }
    }

    /// Asks a question about the loaded document.
    ///
    /// Blank questions, questions outside `Ready` and a second question while
    /// one is pending are rejected without contacting the collaborator. On
    /// failure the pending question is marked failed and the transcript is
    /// left as it was.
    pub async fn ask(&self, question: &str) -> DocQaResult<AnsweredQuestion> {
        let question = question.trim().to_string();
        if question.is_empty() {
            return Err(DocQaError::EmptyQuestion);
        }

        let (generation, id, document, transcript) = {
            let mut inner = self.shared.inner.lock().await;
            let generation = inner.generation;
            let ready = match &mut inner.state {
                SessionState::Ready(ready) => ready,
                _ => return Err(DocQaError::NoDocument),
            };
            let transcript = ready.conversation.transcript();
            let id = ready.conversation.begin_question(&question)?;
            let _ = self.shared.events.send(SessionEvent::QuestionAsked {
                generation,
                id,
                question: question.clone(),
            });
            (generation, id, ready.document.clone(), transcript)
        };

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let result = shared.qa.answer(&document.text, &question, &transcript).await;
            shared.finish_question(generation, id, result).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                let failure = DocQaError::AnswerUnavailable(format!("answer task failed: {}", e));
                self.shared.finish_question(generation, id, Err(failure)).await
            }
        }
    }

    /// Drops the document, summary and conversation. Valid from any state;
    /// resetting an already empty session changes nothing.
    pub async fn reset(&self) -> SessionSnapshot {
        let mut inner = self.shared.inner.lock().await;
        if inner.state.status() != SessionStatus::Empty {
            inner.generation += 1;
            inner.state = SessionState::Empty;
            info!("Session reset (generation {}).", inner.generation);
            self.shared.publish_state(&inner);
        }
        snapshot_of(&inner)
    }
}

impl Shared {
    /// Reads the upload once, then runs extraction and encoding concurrently,
    /// then the summarizer.
    async fn process(&self, file: &UploadedFile, generation: u64) -> DocQaResult<(Document, String)> {
        let bytes = file.read().await?;
        let (text, data_uri) = tokio::join!(
            extract::extract_in_background(bytes.clone()),
            async { data_uri::encode(&bytes, &file.mime_type) }
        );
        let text = text?;

        if text.trim().is_empty() {
            return Err(DocQaError::EmptyExtraction);
        }
        if self.inner.lock().await.generation != generation {
            return Err(DocQaError::Superseded);
        }

        let started = Instant::now();
        let response = self
            .summarizer
            .summarize(&SummaryRequest { document_data_uri: &data_uri })
            .await
            .map_err(|e| DocQaError::SummarizationFailed(e.to_string()))?;
        info!("⏱️ Summary took {:?}.", started.elapsed());

        if response.summary.trim().is_empty() {
            return Err(DocQaError::SummarizationFailed(
                "the summarizer returned an empty summary".to_string(),
            ));
        }

        let document = Document {
            file_name: file.file_name.clone(),
            text,
            data_uri,
        };
        Ok((document, response.summary))
    }

    /// Applies an upload outcome, unless a reset moved the generation on.
    async fn finish_upload(
        &self,
        generation: u64,
        file_name: &str,
        outcome: DocQaResult<(Document, String)>,
    ) -> DocQaResult<SessionSnapshot> {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            info!("Discarding upload result for stale generation {}.", generation);
            return Err(DocQaError::Superseded);
        }
        match outcome {
            Ok((document, summary)) => {
                info!(
                    "Session ready: '{}' ({} chars of text).",
                    document.file_name,
                    document.text.len()
                );
                inner.state = SessionState::Ready(ReadySession {
                    conversation: Conversation::with_summary(&summary),
                    document: Arc::new(document),
                    summary,
                });
                self.publish_state(&inner);
                Ok(snapshot_of(&inner))
            }
            Err(DocQaError::Superseded) => Err(DocQaError::Superseded),
            Err(e) => {
                error!("Upload '{}' failed: {}", file_name, e);
                inner.state = SessionState::Failed { error: e.clone() };
                self.publish_state(&inner);
                Err(e)
            }
        }
    }

    /// Resolves a pending question, unless a reset moved the generation on.
    async fn finish_question(
        &self,
        generation: u64,
        id: Uuid,
        result: DocQaResult<String>,
    ) -> DocQaResult<AnsweredQuestion> {
        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            info!("Discarding answer for stale generation {}.", generation);
            return Err(DocQaError::Superseded);
        }
        let ready = match &mut inner.state {
            SessionState::Ready(ready) => ready,
            _ => return Err(DocQaError::Superseded),
        };

        match result {
            Ok(answer) => {
                ready.conversation.answer(id, answer.clone());
                let turn_count = ready.conversation.transcript().len();
                let _ = self.events.send(SessionEvent::QuestionAnswered {
                    generation,
                    id,
                    answer: answer.clone(),
                });
                Ok(AnsweredQuestion { id, answer, turn_count })
            }
            Err(e) => {
                warn!("Question {} failed: {}", id, e);
                ready.conversation.fail(id, e.to_string());
                let _ = self.events.send(SessionEvent::QuestionFailed {
                    generation,
                    id,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn publish_state(&self, inner: &Inner) {
        let (file_name, error) = match &inner.state {
            SessionState::Processing { file_name } => (Some(file_name.clone()), None),
            SessionState::Ready(ready) => (Some(ready.document.file_name.clone()), None),
            SessionState::Failed { error } => (None, Some(error.to_string())),
            SessionState::Empty => (None, None),
        };
        // No subscribers is not an error.
        let _ = self.events.send(SessionEvent::StateChanged {
            generation: inner.generation,
            status: inner.state.status(),
            file_name,
            error,
        });
    }
}

fn snapshot_of(inner: &Inner) -> SessionSnapshot {
    let mut snapshot = SessionSnapshot {
        generation: inner.generation,
        status: inner.state.status(),
        file_name: None,
        summary: None,
        messages: Vec::new(),
        turn_count: 0,
        error: None,
    };
    match &inner.state {
        SessionState::Empty => {}
        SessionState::Processing { file_name } => snapshot.file_name = Some(file_name.clone()),
        SessionState::Ready(ready) => {
            snapshot.file_name = Some(ready.document.file_name.clone());
            snapshot.summary = Some(ready.summary.clone());
            snapshot.messages = ready.conversation.messages().to_vec();
            snapshot.turn_count = ready.conversation.transcript().len();
        }
        SessionState::Failed { error } => snapshot.error = Some(error.to_string()),
    }
    snapshot
}
