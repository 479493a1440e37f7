pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

// Re-export the handlers so the binary can build the router from one place.
pub use rest::{
    ask_question_handler, get_session_handler, reset_session_handler, upload_document_handler,
};
pub use ws_handler::ws_handler;
