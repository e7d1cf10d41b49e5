//! Backend client module.
//!
//! This module provides the interface to the remote reasoning backend:
//! - `ChatBackend`, the single `chat(messages) -> reply` capability
//! - the wire schema and the formatter that produces it
//! - `HttpChatBackend`, the HTTP gateway implementation

mod format;
mod http;
mod provider;

pub use format::{to_wire_format, WireMessage, WireRole};
pub use http::HttpChatBackend;
pub use provider::{BackendError, BackendResult, ChatBackend};
