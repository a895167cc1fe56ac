//! HTTP Transport
//!
//! JSON-over-HTTPS POST to tool endpoints. Failures never surface as errors:
//! they come back as [`CallOutcome::Failed`] carrying the same
//! `{success: false, ...}` body the endpoint contract documents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::agent::{AgentError, AgentResult};
use crate::config::AgentConfig;

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";
pub const PROJECT_HEADER: &str = "X-Project";
pub const SHARED_SECRET_HEADER: &str = "X-Shared-Secret";

/// Result of one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The endpoint answered and the body carries no failure indicator
    Ok(Value),
    /// HTTP error, transport error, or a body that reports failure
    Failed {
        status: Option<u16>,
        message: String,
        body: Value,
    },
}

impl CallOutcome {
    /// Classify a successfully received body.
    pub fn from_body(body: Value) -> Self {
        if !is_failure_value(&body) {
            return CallOutcome::Ok(body);
        }

        let message = match body.get("error") {
            Some(Value::String(err)) => err.clone(),
            _ if is_falsy(&body) => format!("empty response: {}", body),
            _ => body.to_string(),
        };
        let status = body
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());

        CallOutcome::Failed { status, message, body }
    }

    pub fn http_error(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        CallOutcome::Failed {
            status: Some(status.as_u16()),
            message: format!("HTTP {}: {}", status.as_u16(), reason),
            body: json!({ "success": false, "status": status.as_u16(), "error": reason }),
        }
    }

    pub fn transport_error(description: impl Into<String>) -> Self {
        let description = description.into();
        CallOutcome::Failed {
            status: None,
            message: description.clone(),
            body: json!({ "success": false, "error": description }),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CallOutcome::Ok(_))
    }

    /// The JSON value this call produced, success or not.
    pub fn value(&self) -> &Value {
        match self {
            CallOutcome::Ok(value) => value,
            CallOutcome::Failed { body, .. } => body,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            CallOutcome::Ok(value) => value,
            CallOutcome::Failed { body, .. } => body,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            CallOutcome::Ok(_) => None,
            CallOutcome::Failed { message, .. } => Some(message),
        }
    }
}

/// A JSON value with no content: null, false, zero, or an empty string, array or object.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// A response counts as failed when it is falsy or explicitly says `success: false`.
pub fn is_failure_value(value: &Value) -> bool {
    is_falsy(value) || value.get("success") == Some(&Value::Bool(false))
}

/// Seam between the dispatcher and the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url`, tagging the request with `trace_id`.
    async fn post_json(&self, url: &str, body: &Value, trace_id: &str) -> CallOutcome;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: Client,
    project_id: String,
    shared_secret: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &AgentConfig) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            project_id: config.project_id.clone(),
            shared_secret: config.shared_secret.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value, trace_id: &str) -> CallOutcome {
        let mut request = self
            .client
            .post(url)
            .header(TRACE_ID_HEADER, trace_id)
            .header(PROJECT_HEADER, &self.project_id)
            .json(body);

        if let Some(ref secret) = self.shared_secret {
            request = request.header(SHARED_SECRET_HEADER, secret);
        }

        debug!(%url, trace_id, "POST");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let description = if e.is_timeout() {
                    format!("request to {} timed out after {}s", url, self.timeout.as_secs())
                } else {
                    format!("request to {} failed: {}", url, e)
                };
                warn!(trace_id, "{}", description);
                return CallOutcome::transport_error(description);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, trace_id, status = status.as_u16(), "endpoint returned error status");
            return CallOutcome::http_error(status);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(%url, trace_id, "failed to read response body: {}", e);
                return CallOutcome::transport_error(format!("failed to read response from {}: {}", url, e));
            }
        };
        debug!(%url, trace_id, bytes = text.len(), "response received");

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => CallOutcome::from_body(body),
            Err(_) => CallOutcome::Ok(json!({ "success": true, "text": text })),
        }
    }
}
