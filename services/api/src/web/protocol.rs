//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol used to push session changes from
//! the API server to the browser.

use docqa_core::{SessionEvent, SessionSnapshot};
use serde::Serialize;

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================
// NOTE: The client never sends structured messages on this socket; anything it
// sends other than a close frame is ignored.
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect so the client can render the current state.
    Connected { snapshot: SessionSnapshot },

    /// A session change, forwarded as it happens.
    Event { event: SessionEvent },

    /// The client fell behind and missed `skipped` events. It should refetch the session.
    Lagged { skipped: u64 },
}
