//! Backend Shortcuts
//!
//! `backend.minutes` and `backend.mindmap` post the caller's parameters
//! verbatim to fixed paths on the backend service.

use serde_json::Value;

use super::{OutboundRequest, Tool};
use crate::agent::{AgentError, AgentResult, Parameters};

pub const MINUTES_PATH: &str = "/api/agent/minutes/generate";
pub const MINDMAP_PATH: &str = "/api/speech/generate-mindmap";

pub struct BackendShortcutTool {
    base_url: String,
}

impl BackendShortcutTool {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(action: &str) -> Option<&'static str> {
        match action {
            "minutes" => Some(MINUTES_PATH),
            "mindmap" => Some(MINDMAP_PATH),
            _ => None,
        }
    }
}

impl Tool for BackendShortcutTool {
    fn name(&self) -> &str {
        "backend"
    }

    fn description(&self) -> &str {
        "Backend shortcuts: minutes generation and speech mind maps"
    }

    fn actions(&self) -> Option<&'static [&'static str]> {
        Some(&["minutes", "mindmap"])
    }

    fn prepare(&self, action: &str, parameters: &Parameters) -> AgentResult<OutboundRequest> {
        let path = Self::path_for(action)
            .ok_or_else(|| AgentError::UnknownTask(format!("backend.{}", action)))?;

        Ok(OutboundRequest {
            url: format!("{}{}", self.base_url, path),
            body: Value::Object(parameters.clone()),
        })
    }
}
