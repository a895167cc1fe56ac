//! Tool System Module
//!
//! Routes `namespace.action` task strings to tool endpoints and performs the
//! outbound call. Routing is pure and happens before any network I/O, so an
//! unknown task never reaches the transport.

mod backend;
mod cloud;
mod http;

pub use backend::{BackendShortcutTool, MINDMAP_PATH, MINUTES_PATH};
pub use cloud::CloudFunctionTool;
pub use http::{
    is_failure_value, is_falsy, CallOutcome, HttpTransport, Transport, PROJECT_HEADER,
    SHARED_SECRET_HEADER, TRACE_ID_HEADER,
};

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::agent::{AgentError, AgentResult, Parameters};
use crate::config::AgentConfig;

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    pub body: Value,
}

/// A task plus its parameters, ready to dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Routing key, e.g. `gmail.search_emails`
    pub task: String,
    pub parameters: Parameters,
}

impl ToolCall {
    pub fn new(task: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            task: task.into(),
            parameters,
        }
    }
}

/// A family of actions served by one endpoint, addressed by namespace.
pub trait Tool: Send + Sync {
    /// Namespace this tool answers to (the part before the dot)
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Fixed set of actions, or `None` when any action is forwarded.
    fn actions(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Build the outbound request for `action`. Must not perform I/O.
    fn prepare(&self, action: &str, parameters: &Parameters) -> AgentResult<OutboundRequest>;
}

/// Listing entry for a registered tool.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDescriptor {
    pub namespace: String,
    pub description: String,
    /// Routable task strings; `<namespace>.*` for open namespaces
    pub tasks: Vec<String>,
}

/// Registry of tools keyed by namespace, sharing one transport.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    transport: Arc<dyn Transport>,
}

impl ToolRegistry {
    /// Create an empty registry over `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            tools: HashMap::new(),
            transport,
        }
    }

    /// Registry with the five namespace tools and the backend shortcuts,
    /// calling out over HTTP.
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_standard_tools(config, transport))
    }

    pub fn with_standard_tools(config: &AgentConfig, transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::new(transport);
        for tool in CloudFunctionTool::all(&config.endpoints) {
            registry.register_instance(tool);
        }
        registry.register_instance(BackendShortcutTool::new(config.backend_base.clone()));
        registry
    }

    /// Register a tool instance, replacing any tool with the same namespace
    pub fn register_instance<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    /// Registered namespaces, sorted
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| {
                let tool = self.tools.get(&name)?;
                let tasks = match tool.actions() {
                    Some(actions) => actions.iter().map(|a| format!("{}.{}", name, a)).collect(),
                    None => vec![format!("{}.*", name)],
                };
                Some(ToolDescriptor {
                    description: tool.description().to_string(),
                    namespace: name,
                    tasks,
                })
            })
            .collect()
    }

    /// Resolve a task string into its outbound request without sending it.
    pub fn resolve(&self, task: &str, parameters: &Parameters) -> AgentResult<OutboundRequest> {
        let unknown = || AgentError::UnknownTask(task.to_string());

        let (namespace, action) = task.split_once('.').ok_or_else(unknown)?;
        let tool = self.tools.get(namespace).ok_or_else(unknown)?;

        tool.prepare(action, parameters).map_err(|e| match e {
            AgentError::UnknownTask(_) => unknown(),
            other => other,
        })
    }

    /// Route `task` and POST it once.
    ///
    /// Returns `Err(UnknownTask)` for unroutable tasks, before any I/O.
    /// Call failures come back as `Ok(CallOutcome::Failed { .. })`.
    pub async fn dispatch(
        &self,
        task: &str,
        parameters: &Parameters,
        trace_id: &str,
    ) -> AgentResult<CallOutcome> {
        let request = self.resolve(task, parameters)?;
        info!(task, trace_id, url = %request.url, "dispatching");

        let outcome = self.transport.post_json(&request.url, &request.body, trace_id).await;
        debug!(task, trace_id, ok = outcome.is_ok(), "dispatch finished");
        Ok(outcome)
    }

    pub async fn execute(&self, call: &ToolCall, trace_id: &str) -> AgentResult<CallOutcome> {
        self.dispatch(&call.task, &call.parameters, trace_id).await
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://tools.test";

    fn registry_with(transport: Arc<MockTransport>) -> ToolRegistry {
        let config = AgentConfig::default().with_base_url(BASE);
        ToolRegistry::with_standard_tools(&config, transport)
    }

    fn params(value: Value) -> Parameters {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_unknown_task_fails_without_io() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with(transport.clone());

        for task in ["unknown.foo", "calendar", "", "backend.summary", "gmail.", ".get_events"] {
            let result = tokio_test::block_on(registry.dispatch(task, &Parameters::new(), "t"));
            match result {
                Err(AgentError::UnknownTask(t)) => assert_eq!(t, task),
                other => panic!("expected UnknownTask for {:?}, got {:?}", task, other),
            }
        }
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_namespace_dispatch_posts_action_body() {
        let transport = Arc::new(
            MockTransport::new()
                .respond(format!("{}/calendarTool", BASE), CallOutcome::Ok(json!({"events": []}))),
        );
        let registry = registry_with(transport.clone());

        let outcome = registry
            .dispatch("calendar.get_events", &params(json!({"a": 1})), "trace-1")
            .await
            .unwrap();

        assert_eq!(outcome, CallOutcome::Ok(json!({"events": []})));
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://tools.test/calendarTool");
        assert_eq!(calls[0].body, json!({"action": "get_events", "parameters": {"a": 1}}));
        assert_eq!(calls[0].trace_id, "trace-1");
    }

    #[tokio::test]
    async fn test_every_namespace_routes_to_its_endpoint() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with(transport.clone());

        let cases = [
            ("calendar.x", "/calendarTool"),
            ("gmail.x", "/gmailTool"),
            ("drive.x", "/driveTool"),
            ("decision.x", "/decisionTool"),
            ("data_pipeline.x", "/dataPipeline"),
            ("backend.minutes", MINUTES_PATH),
            ("backend.mindmap", MINDMAP_PATH),
        ];
        for (task, _) in cases {
            registry.dispatch(task, &Parameters::new(), "t").await.unwrap();
        }

        let urls: Vec<_> = transport.calls().into_iter().map(|c| c.url).collect();
        let expected: Vec<_> = cases.iter().map(|(_, path)| format!("{}{}", BASE, path)).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn test_backend_shortcut_posts_raw_parameters() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with(transport.clone());

        registry
            .execute(&ToolCall::new("backend.minutes", params(json!({"meetingId": "m1"}))), "t")
            .await
            .unwrap();

        assert_eq!(transport.calls()[0].body, json!({"meetingId": "m1"}));
    }

    #[tokio::test]
    async fn test_transport_failure_is_inline_value() {
        let transport = Arc::new(MockTransport::new());
        let registry = registry_with(transport);

        let outcome = registry.dispatch("drive.list_files", &Parameters::new(), "t").await.unwrap();
        assert!(!outcome.is_ok());
        assert_eq!(outcome.value()["success"], false);
    }

    #[test]
    fn test_describe_lists_tasks() {
        let registry = registry_with(Arc::new(MockTransport::new()));
        assert_eq!(
            registry.tool_names(),
            ["backend", "calendar", "data_pipeline", "decision", "drive", "gmail"]
        );

        let described = registry.describe();
        let backend = described.iter().find(|d| d.namespace == "backend").unwrap();
        assert_eq!(backend.tasks, ["backend.minutes", "backend.mindmap"]);
        let gmail = described.iter().find(|d| d.namespace == "gmail").unwrap();
        assert_eq!(gmail.tasks, ["gmail.*"]);
    }
}
