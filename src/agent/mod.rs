//! Agent Module
//!
//! Request/response envelopes and the error type shared by the
//! dispatcher and the orchestrator.

mod error;
mod types;

pub use error::{AgentError, AgentResult};
pub use types::{ErrorRecord, Parameters, QueryRequest, QueryResponse, ToolCallRecord};

/// Generate a fresh opaque trace id (16 lowercase hex characters).
pub fn new_trace_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}
