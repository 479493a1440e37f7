//! crates/docqa_core/src/qa.rs
//!
//! The question-answering orchestrator. Stateless: every call carries the
//! document text and the full transcript it needs.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::domain::Turn;
use crate::error::{DocQaError, DocQaResult};
use crate::ports::{AnswerRequest, AnsweringService};

#[derive(Clone)]
pub struct QaOrchestrator {
    answerer: Arc<dyn AnsweringService>,
}

impl QaOrchestrator {
    pub fn new(answerer: Arc<dyn AnsweringService>) -> Self {
        Self { answerer }
    }

    /// Asks the answering collaborator and validates its reply.
    ///
    /// Any collaborator error or blank answer becomes `AnswerUnavailable`.
    pub async fn answer(
        &self,
        document_text: &str,
        question: &str,
        transcript: &[Turn],
    ) -> DocQaResult<String> {
        let request = AnswerRequest {
            document_text,
            question,
            conversation_history: transcript,
        };

        let started = Instant::now();
        let response = self.answerer.answer(&request).await.map_err(|e| {
            error!("Answering collaborator failed: {}", e);
            DocQaError::AnswerUnavailable(e.to_string())
        })?;
        info!(
            "⏱️ Answer took {:?} ({} prior turns, {} chars).",
            started.elapsed(),
            transcript.len(),
            response.answer.len()
        );

        if response.answer.trim().is_empty() {
            return Err(DocQaError::AnswerUnavailable(
                "The AI could not find an answer.".to_string(),
            ));
        }
        Ok(response.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{AnswerResponse, PortError, PortResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedAnswerer {
        reply: Mutex<Option<PortResult<AnswerResponse>>>,
        seen: Mutex<Vec<serde_json::Value>>,
    }

    impl ScriptedAnswerer {
        fn new(reply: PortResult<AnswerResponse>) -> Arc<Self> {
            Arc::new(Self { reply: Mutex::new(Some(reply)), seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl AnsweringService for ScriptedAnswerer {
        async fn answer(&self, request: &AnswerRequest<'_>) -> PortResult<AnswerResponse> {
            self.seen.lock().unwrap().push(serde_json::to_value(request).unwrap());
            self.reply.lock().unwrap().take().unwrap()
        }
    }

    #[tokio::test]
    async fn test_request_carries_full_context() {
        let answerer = ScriptedAnswerer::new(Ok(AnswerResponse { answer: "A2".into() }));
        let qa = QaOrchestrator::new(answerer.clone());
        let transcript = vec![Turn { question: "Q1".into(), answer: "A1".into() }];

        let answer = qa.answer("doc text\n", "Q2", &transcript).await.unwrap();
        assert_eq!(answer, "A2");

        let seen = answerer.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            serde_json::json!({
                "documentText": "doc text\n",
                "question": "Q2",
                "conversationHistory": [{ "question": "Q1", "answer": "A1" }],
            })
        );
    }

    #[tokio::test]
    async fn test_collaborator_error_is_answer_unavailable() {
        let answerer = ScriptedAnswerer::new(Err(PortError::Unexpected("503".into())));
        let err = QaOrchestrator::new(answerer).answer("doc", "Q", &[]).await.unwrap_err();
        assert!(matches!(err, DocQaError::AnswerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_blank_answer_is_answer_unavailable() {
        let answerer = ScriptedAnswerer::new(Ok(AnswerResponse { answer: "  \n".into() }));
        let err = QaOrchestrator::new(answerer).answer("doc", "Q", &[]).await.unwrap_err();
        assert!(matches!(err, DocQaError::AnswerUnavailable(_)));
    }
}
