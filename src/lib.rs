//! Dispatch Agent
//!
//! A single-entry orchestration shim:
//! - Routes `namespace.action` tasks to fixed HTTP tool endpoints
//! - Asks a decision service to classify free-text input
//! - Follows up with at most one heuristic call
//! - Returns a normalized envelope with trace id, calls and errors

pub mod agent;
pub mod config;
pub mod orchestrator;
pub mod server;
pub mod tools;
pub mod utils;

// Re-exports for convenience
pub use agent::{AgentError, AgentResult, QueryRequest, QueryResponse};
pub use config::AgentConfig;
pub use orchestrator::Supervisor;
pub use tools::ToolRegistry;
