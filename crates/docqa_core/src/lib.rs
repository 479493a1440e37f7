pub mod conversation;
pub mod data_uri;
pub mod domain;
pub mod error;
pub mod extract;
pub mod ports;
pub mod qa;
pub mod session;
pub mod transcript;
pub mod upload;

pub use conversation::Conversation;
pub use domain::{ChatMessage, Document, HistoryMessage, MessageRole, QuestionEntry, QuestionStatus, Transcript, Turn, PDF_MIME_TYPE};
pub use error::{DocQaError, DocQaResult};
pub use ports::{AnswerRequest, AnswerResponse, AnsweringService, PortError, PortResult,
    SummarizationService, SummaryRequest, SummaryResponse};
pub use qa::QaOrchestrator;
pub use session::{AnsweredQuestion, SessionController, SessionEvent, SessionSnapshot, SessionState, SessionStatus};
pub use upload::{FileSource, UploadedFile};
