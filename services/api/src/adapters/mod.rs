pub mod qa_llm;
pub mod reply;
pub mod summarize_llm;

pub use qa_llm::OpenAiQaAdapter;
pub use summarize_llm::OpenAiSummaryAdapter;
