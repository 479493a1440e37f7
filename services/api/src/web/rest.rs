//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use docqa_core::{
    AnsweredQuestion, ChatMessage, DocQaError, QuestionEntry, QuestionStatus, SessionSnapshot,
    SessionStatus, UploadedFile,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_document_handler,
        get_session_handler,
        ask_question_handler,
        reset_session_handler,
    ),
    components(
        schemas(
            AskQuestionPayload,
            AnswerPayload,
            SessionSnapshot,
            SessionStatus,
            ChatMessage,
            QuestionEntry,
            QuestionStatus
        )
    ),
    tags(
        (name = "DocQA API", description = "Upload a PDF, read its summary, and ask questions about it.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request body for asking a question.
#[derive(Deserialize, ToSchema)]
pub struct AskQuestionPayload {
    pub question: String,
}

/// The response payload sent after a question has been answered.
#[derive(Serialize, ToSchema)]
pub struct AnswerPayload {
    id: Uuid,
    answer: String,
    /// Resolved question/answer pairs in the conversation, including this one.
    turn_count: usize,
}

impl From<AnsweredQuestion> for AnswerPayload {
    fn from(answered: AnsweredQuestion) -> Self {
        Self {
            id: answered.id,
            answer: answered.answer,
            turn_count: answered.turn_count,
        }
    }
}

/// Maps a session error onto the HTTP status the client sees.
pub fn status_for(err: &DocQaError) -> StatusCode {
    match err {
        DocQaError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        DocQaError::MalformedDocument(_) | DocQaError::EmptyExtraction => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DocQaError::SummarizationFailed(_) | DocQaError::AnswerUnavailable(_) => {
            StatusCode::BAD_GATEWAY
        }
        DocQaError::SourceReadFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DocQaError::EmptyQuestion => StatusCode::BAD_REQUEST,
        DocQaError::NoDocument
        | DocQaError::QuestionInFlight
        | DocQaError::SessionBusy
        | DocQaError::Superseded => StatusCode::CONFLICT,
    }
}

fn reject(err: DocQaError) -> (StatusCode, String) {
    (status_for(&err), err.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a PDF and wait for its summary.
///
/// Accepts a multipart/form-data request with a single file part. The part's
/// content type must be `application/pdf`.
#[utoipa::path(
    post,
    path = "/document",
    request_body(content_type = "multipart/form-data", description = "The PDF to upload."),
    responses(
        (status = 200, description = "Document processed; the session is ready", body = SessionSnapshot),
        (status = 400, description = "Missing or unreadable file part"),
        (status = 409, description = "A document is already loaded or processing"),
        (status = 415, description = "The file is not a PDF"),
        (status = 422, description = "The PDF is malformed or has no text layer"),
        (status = 502, description = "The summarizer failed")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;

    let file_name = field.file_name().unwrap_or("untitled.pdf").to_string();
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;
    info!("Received upload '{}' ({}, {} bytes).", file_name, mime_type, data.len());

    match app_state
        .session
        .submit_file(UploadedFile::from_bytes(file_name, mime_type, data))
        .await
    {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to process upload: {}", e);
            Err(reject(e))
        }
    }
}

/// Get the current session: status, summary, and conversation.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "The current session snapshot", body = SessionSnapshot)
    )
)]
pub async fn get_session_handler(State(app_state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(app_state.session.snapshot().await)
}

/// Ask a question about the loaded document.
#[utoipa::path(
    post,
    path = "/questions",
    request_body = AskQuestionPayload,
    responses(
        (status = 200, description = "The question was answered", body = AnswerPayload),
        (status = 400, description = "The question is empty"),
        (status = 409, description = "No document is loaded, or a question is already pending"),
        (status = 502, description = "The answering model failed")
    )
)]
pub async fn ask_question_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AskQuestionPayload>,
) -> Result<Json<AnswerPayload>, (StatusCode, String)> {
    match app_state.session.ask(&payload.question).await {
        Ok(answered) => Ok(Json(answered.into())),
        Err(e) => {
            warn!("Question rejected: {}", e);
            Err(reject(e))
        }
    }
}

/// Discard the document and conversation.
#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 200, description = "The session is empty", body = SessionSnapshot)
    )
)]
pub async fn reset_session_handler(State(app_state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(app_state.session.reset().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::{
        AnswerRequest, AnswerResponse, AnsweringService, PortError, PortResult, QaOrchestrator,
        SessionController, SummarizationService, SummaryRequest, SummaryResponse,
    };

    struct Unreachable;

    #[async_trait]
    impl SummarizationService for Unreachable {
        async fn summarize(&self, _: &SummaryRequest<'_>) -> PortResult<SummaryResponse> {
            Err(PortError::Unexpected("not wired in tests".into()))
        }
    }

    #[async_trait]
    impl AnsweringService for Unreachable {
        async fn answer(&self, _: &AnswerRequest<'_>) -> PortResult<AnswerResponse> {
            Err(PortError::Unexpected("not wired in tests".into()))
        }
    }

    fn app_state() -> Arc<AppState> {
        let session = SessionController::new(
            Arc::new(Unreachable),
            QaOrchestrator::new(Arc::new(Unreachable)),
        );
        Arc::new(AppState { session: Arc::new(session) })
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DocQaError::UnsupportedFileType("text/plain".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(status_for(&DocQaError::EmptyExtraction), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_for(&DocQaError::AnswerUnavailable("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_for(&DocQaError::QuestionInFlight), StatusCode::CONFLICT);
        assert_eq!(status_for(&DocQaError::EmptyQuestion), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_openapi_describes_session_payloads() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        for name in ["SessionSnapshot", "SessionStatus", "ChatMessage", "QuestionEntry", "AnswerPayload"] {
            assert!(schemas.get(name).is_some(), "missing schema {}", name);
        }

        let session_ok = &doc["paths"]["/session"]["get"]["responses"]["200"];
        assert_eq!(
            session_ok["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/SessionSnapshot"
        );
    }

    #[tokio::test]
    async fn test_fresh_session_is_empty() {
        let Json(snapshot) = get_session_handler(State(app_state())).await;
        assert_eq!(snapshot.status, SessionStatus::Empty);
        assert!(snapshot.messages.is_empty());
    }

    #[tokio::test]
    async fn test_question_without_document_conflicts() {
        let payload = AskQuestionPayload { question: "What is this?".into() };
        let (status, message) = ask_question_handler(State(app_state()), Json(payload))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(message.contains("Upload a PDF"));
    }

    #[tokio::test]
    async fn test_reset_on_empty_session() {
        let Json(snapshot) = reset_session_handler(State(app_state())).await;
        assert_eq!(snapshot.status, SessionStatus::Empty);
        assert_eq!(snapshot.generation, 0);
    }
}
