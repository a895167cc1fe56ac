//! Agent Configuration
//!
//! Endpoint URLs, project identity and call limits. Built once at start-up
//! (usually from the environment) and handed to the registry and supervisor;
//! nothing reads the environment while a request is in flight.

use std::time::Duration;

use serde::Serialize;

use crate::agent::{AgentError, AgentResult};

pub const DEFAULT_PROJECT_ID: &str = "smartmeet-470807";
pub const DEFAULT_LOCATION: &str = "asia-northeast1";
pub const DEFAULT_BACKEND_BASE: &str = "https://smartmeet-backend-184930122798.asia-northeast1.run.app";
const DEFAULT_FUNCTIONS_BASE: &str = "https://asia-northeast1-smartmeet-470807.cloudfunctions.net";

pub const DEFAULT_TIMEOUT_SECS: u64 = 25;
pub const DEFAULT_RESULT_BYTE_LIMIT: usize = 6000;
pub const DEFAULT_INPUT_ECHO_LIMIT: usize = 2000;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// URLs of the five tool endpoints, one per task namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolEndpoints {
    pub calendar: String,
    pub gmail: String,
    pub drive: String,
    pub decision: String,
    pub data_pipeline: String,
}

impl ToolEndpoints {
    /// Endpoints laid out under a single base URL using the standard function names.
    pub fn under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            calendar: format!("{}/calendarTool", base),
            gmail: format!("{}/gmailTool", base),
            drive: format!("{}/driveTool", base),
            decision: format!("{}/decisionTool", base),
            data_pipeline: format!("{}/dataPipeline", base),
        }
    }
}

impl Default for ToolEndpoints {
    fn default() -> Self {
        Self::under(DEFAULT_FUNCTIONS_BASE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentConfig {
    pub project_id: String,
    pub location: String,
    pub endpoints: ToolEndpoints,
    /// Base URL for the `backend.*` shortcuts
    pub backend_base: String,
    /// Sent as `X-Shared-Secret` when present
    #[serde(skip_serializing)]
    pub shared_secret: Option<String>,
    /// Per-call timeout for outbound requests
    pub timeout: Duration,
    /// Byte cap for results copied into tool-call records
    pub result_byte_limit: usize,
    /// Character cap for the input echoed into the decision call record
    pub input_echo_limit: usize,
    /// Run decision analysis after a failed explicit task
    pub fallback_on_task_failure: bool,
    pub bind_addr: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            endpoints: ToolEndpoints::default(),
            backend_base: DEFAULT_BACKEND_BASE.to_string(),
            shared_secret: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            result_byte_limit: DEFAULT_RESULT_BYTE_LIMIT,
            input_echo_limit: DEFAULT_INPUT_ECHO_LIMIT,
            fallback_on_task_failure: false,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AgentConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset. Malformed numbers or booleans are a
    /// configuration error.
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();
        let endpoints = ToolEndpoints {
            calendar: get("CF_CALENDAR_URL").unwrap_or(defaults.endpoints.calendar),
            gmail: get("CF_GMAIL_URL").unwrap_or(defaults.endpoints.gmail),
            drive: get("CF_DRIVE_URL").unwrap_or(defaults.endpoints.drive),
            decision: get("CF_DECISION_URL").unwrap_or(defaults.endpoints.decision),
            data_pipeline: get("CF_DATA_PIPELINE_URL").unwrap_or(defaults.endpoints.data_pipeline),
        };

        let timeout_secs = match get("AGENT_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("AGENT_HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(AgentError::Config(
                "AGENT_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            project_id: get("GOOGLE_CLOUD_PROJECT_ID").unwrap_or(defaults.project_id),
            location: get("VERTEX_AI_LOCATION").unwrap_or(defaults.location),
            endpoints,
            backend_base: get("BACKEND_BASE_URL").unwrap_or(defaults.backend_base),
            shared_secret: get("SM_SHARED_SECRET"),
            timeout: Duration::from_secs(timeout_secs),
            result_byte_limit: match get("AGENT_RESULT_BYTE_LIMIT") {
                Some(raw) => parse_number("AGENT_RESULT_BYTE_LIMIT", &raw)?,
                None => defaults.result_byte_limit,
            },
            input_echo_limit: match get("AGENT_INPUT_ECHO_LIMIT") {
                Some(raw) => parse_number("AGENT_INPUT_ECHO_LIMIT", &raw)?,
                None => defaults.input_echo_limit,
            },
            fallback_on_task_failure: match get("AGENT_FALLBACK_ON_TASK_FAILURE") {
                Some(raw) => parse_flag("AGENT_FALLBACK_ON_TASK_FAILURE", &raw)?,
                None => defaults.fallback_on_task_failure,
            },
            bind_addr: get("AGENT_BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }

    /// Point every tool endpoint and the backend base at `base`.
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.endpoints = ToolEndpoints::under(base);
        self.backend_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_shared_secret(mut self, secret: impl Into<String>) -> Self {
        self.shared_secret = Some(secret.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_result_byte_limit(mut self, limit: usize) -> Self {
        self.result_byte_limit = limit;
        self
    }

    pub fn with_fallback_on_task_failure(mut self, enabled: bool) -> Self {
        self.fallback_on_task_failure = enabled;
        self
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AgentResult<T> {
    raw.parse::<T>()
        .map_err(|_| AgentError::Config(format!("{} is not a valid number: '{}'", key, raw)))
}

fn parse_flag(key: &str, raw: &str) -> AgentResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AgentError::Config(format!("{} is not a valid boolean: '{}'", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = AgentConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(
            config.endpoints.decision,
            "https://asia-northeast1-smartmeet-470807.cloudfunctions.net/decisionTool"
        );
        assert_eq!(config.timeout, Duration::from_secs(25));
        assert!(config.shared_secret.is_none());
        assert!(!config.fallback_on_task_failure);
    }

    #[test]
    fn test_overrides_applied() {
        let config = AgentConfig::from_lookup(lookup_from(&[
            ("GOOGLE_CLOUD_PROJECT_ID", "demo-project"),
            ("CF_GMAIL_URL", "http://localhost:9000/gmail"),
            ("SM_SHARED_SECRET", "s3cret"),
            ("AGENT_HTTP_TIMEOUT_SECS", "5"),
            ("AGENT_FALLBACK_ON_TASK_FAILURE", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.project_id, "demo-project");
        assert_eq!(config.endpoints.gmail, "http://localhost:9000/gmail");
        assert_eq!(config.endpoints.calendar, ToolEndpoints::default().calendar);
        assert_eq!(config.shared_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.fallback_on_task_failure);
    }

    #[test]
    fn test_empty_secret_is_unset() {
        let config = AgentConfig::from_lookup(lookup_from(&[("SM_SHARED_SECRET", "  ")])).unwrap();
        assert!(config.shared_secret.is_none());
    }

    #[test]
    fn test_malformed_values_rejected() {
        let err = AgentConfig::from_lookup(lookup_from(&[("AGENT_HTTP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));

        let err = AgentConfig::from_lookup(lookup_from(&[("AGENT_HTTP_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));

        let err = AgentConfig::from_lookup(lookup_from(&[("AGENT_FALLBACK_ON_TASK_FAILURE", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("AGENT_FALLBACK_ON_TASK_FAILURE"));
    }

    #[test]
    fn test_with_base_url_rewrites_all_endpoints() {
        let config = AgentConfig::default().with_base_url("http://127.0.0.1:4000/");
        assert_eq!(config.endpoints.calendar, "http://127.0.0.1:4000/calendarTool");
        assert_eq!(config.endpoints.data_pipeline, "http://127.0.0.1:4000/dataPipeline");
        assert_eq!(config.backend_base, "http://127.0.0.1:4000");
    }
}
