//! Cloud Function Tools
//!
//! One tool per task namespace. Each forwards `{action, parameters}` to the
//! namespace's configured endpoint.

use serde_json::json;

use super::{OutboundRequest, Tool};
use crate::agent::{AgentError, AgentResult, Parameters};
use crate::config::ToolEndpoints;

pub struct CloudFunctionTool {
    namespace: &'static str,
    description: &'static str,
    url: String,
}

impl CloudFunctionTool {
    pub fn new(namespace: &'static str, description: &'static str, url: impl Into<String>) -> Self {
        Self {
            namespace,
            description,
            url: url.into(),
        }
    }

    pub fn calendar(url: impl Into<String>) -> Self {
        Self::new("calendar", "Calendar events: listing, creation and slot lookup", url)
    }

    pub fn gmail(url: impl Into<String>) -> Self {
        Self::new("gmail", "Mailbox search and message actions", url)
    }

    pub fn drive(url: impl Into<String>) -> Self {
        Self::new("drive", "Drive file listing and document access", url)
    }

    pub fn decision(url: impl Into<String>) -> Self {
        Self::new("decision", "Situation analysis and urgency classification", url)
    }

    pub fn data_pipeline(url: impl Into<String>) -> Self {
        Self::new("data_pipeline", "Ingestion and export jobs", url)
    }

    /// The five namespace tools for a set of endpoints.
    pub fn all(endpoints: &ToolEndpoints) -> Vec<Self> {
        vec![
            Self::calendar(endpoints.calendar.clone()),
            Self::gmail(endpoints.gmail.clone()),
            Self::drive(endpoints.drive.clone()),
            Self::decision(endpoints.decision.clone()),
            Self::data_pipeline(endpoints.data_pipeline.clone()),
        ]
    }
}

impl Tool for CloudFunctionTool {
    fn name(&self) -> &str {
        self.namespace
    }

    fn description(&self) -> &str {
        self.description
    }

    fn prepare(&self, action: &str, parameters: &Parameters) -> AgentResult<OutboundRequest> {
        if action.is_empty() {
            return Err(AgentError::UnknownTask(format!("{}.", self.namespace)));
        }

        Ok(OutboundRequest {
            url: self.url.clone(),
            body: json!({ "action": action, "parameters": parameters }),
        })
    }
}
