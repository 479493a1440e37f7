//! crates/docqa_core/src/error.rs
//!
//! The error taxonomy shared by the whole upload and question-answering pipeline.
//! Every variant renders a message that can be shown to the user as-is.

/// Errors raised by the document session pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocQaError {
    /// The submitted file is not a PDF. Raised before any processing begins.
    #[error("Invalid file type '{0}'. Please upload a PDF.")]
    UnsupportedFileType(String),

    /// The bytes could not be parsed as a PDF document.
    #[error("The file could not be read as a PDF document: {0}")]
    MalformedDocument(String),

    /// The PDF parsed, but no page carries any text.
    #[error("Could not extract text from the PDF. The document might be empty or a scanned image.")]
    EmptyExtraction,

    #[error("Failed to summarize document: {0}")]
    SummarizationFailed(String),

    #[error("Failed to get an answer: {0}")]
    AnswerUnavailable(String),

    /// The underlying file could not be read.
    #[error("Failed to read the uploaded file: {0}")]
    SourceReadFailure(String),

    #[error("No document is loaded. Upload a PDF first.")]
    NoDocument,

    #[error("A question is already being answered. Wait for it to finish.")]
    QuestionInFlight,

    #[error("Questions cannot be empty.")]
    EmptyQuestion,

    /// An upload was attempted while another document is processing or active.
    #[error("A document is already loaded or being processed. Reset the session first.")]
    SessionBusy,

    /// The session was reset while this request was in flight; its result was dropped.
    #[error("The session was reset before this request completed.")]
    Superseded,
}

/// A convenience type alias for `Result<T, DocQaError>`.
pub type DocQaResult<T> = Result<T, DocQaError>;
