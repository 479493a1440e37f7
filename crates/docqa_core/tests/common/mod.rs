//! Shared fakes and fixtures for the session integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docqa_core::{
    AnswerRequest, AnswerResponse, AnsweringService, PortError, PortResult, QaOrchestrator,
    SessionController, SummarizationService, SummaryRequest, SummaryResponse, Turn,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

//=========================================================================================
// Gate: lets a test hold a collaborator call open
//=========================================================================================

#[derive(Default)]
pub struct Gate {
    enabled: bool,
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    pub fn closed() -> Self {
        Self { enabled: true, ..Default::default() }
    }

    async fn pass(&self) {
        if self.enabled {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

//=========================================================================================
// Fake summarizer
//=========================================================================================

pub struct FakeSummarizer {
    replies: Mutex<VecDeque<PortResult<SummaryResponse>>>,
    pub calls: AtomicUsize,
    pub seen_uris: Mutex<Vec<String>>,
    pub gate: Gate,
}

impl FakeSummarizer {
    pub fn new(replies: Vec<PortResult<SummaryResponse>>) -> Arc<Self> {
        Self::with_gate(replies, Gate::default())
    }

    pub fn with_gate(replies: Vec<PortResult<SummaryResponse>>, gate: Gate) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            seen_uris: Mutex::new(Vec::new()),
            gate,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn summary(text: &str) -> PortResult<SummaryResponse> {
    Ok(SummaryResponse { summary: text.to_string() })
}

#[async_trait]
impl SummarizationService for FakeSummarizer {
    async fn summarize(&self, request: &SummaryRequest<'_>) -> PortResult<SummaryResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_uris.lock().unwrap().push(request.document_data_uri.to_string());
        self.gate.pass().await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unexpected("no scripted summary".into())))
    }
}

//=========================================================================================
// Fake answerer
//=========================================================================================

#[derive(Debug, Clone)]
pub struct RecordedQuestion {
    pub document_text: String,
    pub question: String,
    pub history: Vec<Turn>,
}

pub struct FakeAnswerer {
    replies: Mutex<VecDeque<PortResult<AnswerResponse>>>,
    pub requests: Mutex<Vec<RecordedQuestion>>,
    pub gate: Gate,
}

impl FakeAnswerer {
    pub fn new(replies: Vec<PortResult<AnswerResponse>>) -> Arc<Self> {
        Self::with_gate(replies, Gate::default())
    }

    pub fn with_gate(replies: Vec<PortResult<AnswerResponse>>, gate: Gate) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            gate,
        })
    }

    pub fn requests(&self) -> Vec<RecordedQuestion> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn answer(text: &str) -> PortResult<AnswerResponse> {
    Ok(AnswerResponse { answer: text.to_string() })
}

#[async_trait]
impl AnsweringService for FakeAnswerer {
    async fn answer(&self, request: &AnswerRequest<'_>) -> PortResult<AnswerResponse> {
        self.requests.lock().unwrap().push(RecordedQuestion {
            document_text: request.document_text.to_string(),
            question: request.question.to_string(),
            history: request.conversation_history.to_vec(),
        });
        self.gate.pass().await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unexpected("no scripted answer".into())))
    }
}

pub fn controller(summarizer: Arc<FakeSummarizer>, answerer: Arc<FakeAnswerer>) -> Arc<SessionController> {
    Arc::new(SessionController::new(summarizer, QaOrchestrator::new(answerer)))
}

//=========================================================================================
// PDF fixtures
//=========================================================================================

/// Builds a PDF with one page per entry; each string is drawn as its own fragment.
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for fragments in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Integer(11)]),
        ];
        for fragment in fragments.iter() {
            operations.push(Operation::new("Td", vec![Object::Integer(0), Object::Integer(-13)]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*fragment)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A PDF whose pages carry no text layer at all.
pub fn scanned_pdf(page_count: usize) -> Vec<u8> {
    let empty: Vec<&[&str]> = (0..page_count).map(|_| &[][..]).collect();
    pdf_with_pages(&empty)
}
