use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters passed to a tool: a JSON object keyed by parameter name.
pub type Parameters = Map<String, Value>;

/// Inbound request for a single `query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Free-text user input or situation context
    #[serde(default)]
    pub input: String,
    /// Explicit routing key, e.g. `calendar.get_events`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
}

impl QueryRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Audit entry for one outbound dispatch attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub task: String,
    pub params: Parameters,
    /// Copy of the raw response, capped to the configured byte limit
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub task: String,
    pub message: String,
}

/// Normalized envelope returned by every `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub trace_id: String,
    pub input: String,
    pub routed_task: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub output: Value,
    pub errors: Vec<ErrorRecord>,
}

impl QueryResponse {
    pub fn new(trace_id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            input: input.into(),
            routed_task: String::new(),
            tool_calls: Vec::new(),
            output: Value::Null,
            errors: Vec::new(),
        }
    }

    pub fn record_call(&mut self, task: impl Into<String>, params: Parameters, result: Value) {
        self.tool_calls.push(ToolCallRecord {
            task: task.into(),
            params,
            result,
        });
    }

    pub fn record_error(&mut self, task: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ErrorRecord {
            task: task.into(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_serializes_camel_case_keys() {
        let mut response = QueryResponse::new("abc123", "hello");
        response.routed_task = "gmail.search_emails".to_string();
        response.record_error("gmail.search_emails", "HTTP 500");

        let value = serde_json::to_value(&response).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["traceId", "input", "routedTask", "toolCalls", "output", "errors"] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert!(value["toolCalls"].is_array());
        assert_eq!(value["errors"][0]["task"], "gmail.search_emails");
    }

    #[test]
    fn test_request_defaults_when_fields_missing() {
        let req: QueryRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.input, "");
        assert!(req.task.is_none());
        assert!(req.parameters.is_none());

        let req: QueryRequest = serde_json::from_value(json!({
            "input": "x",
            "task": "drive.list_files",
            "parameters": {"folder": "root"}
        }))
        .unwrap();
        assert_eq!(req.task.as_deref(), Some("drive.list_files"));
        assert_eq!(req.parameters.unwrap()["folder"], "root");
    }
}
