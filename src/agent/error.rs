use thiserror::Error;

/// Errors raised by the dispatch agent.
///
/// Outbound call failures are not represented here: they travel as
/// [`crate::tools::CallOutcome::Failed`] values and end up as error records
/// in the response envelope.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The task string did not match any routable form.
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;
