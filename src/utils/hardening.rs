//! Startup Checks
//!
//! Verifies the configuration before the agent accepts requests. Malformed
//! endpoint URLs abort start-up; softer issues are logged as warnings.

use reqwest::Url;
use tracing::{info, warn};

use crate::agent::{AgentError, AgentResult};
use crate::config::AgentConfig;

pub struct StartupChecks;

impl StartupChecks {
    /// Run all checks. Returns Err if any endpoint URL is unusable.
    pub fn verify(config: &AgentConfig) -> AgentResult<()> {
        let endpoints = [
            ("CF_CALENDAR_URL", &config.endpoints.calendar),
            ("CF_GMAIL_URL", &config.endpoints.gmail),
            ("CF_DRIVE_URL", &config.endpoints.drive),
            ("CF_DECISION_URL", &config.endpoints.decision),
            ("CF_DATA_PIPELINE_URL", &config.endpoints.data_pipeline),
            ("BACKEND_BASE_URL", &config.backend_base),
        ];

        for (key, url) in endpoints {
            Self::check_url(key, url)?;
        }

        if config.shared_secret.is_none() {
            warn!("SM_SHARED_SECRET is not set; outbound calls carry no shared secret");
        }
        if config.result_byte_limit == 0 {
            warn!("AGENT_RESULT_BYTE_LIMIT is 0; tool-call records will hold null results");
        }

        info!(
            project = %config.project_id,
            location = %config.location,
            timeout_secs = config.timeout.as_secs(),
            "configuration verified"
        );
        Ok(())
    }

    fn check_url(key: &str, raw: &str) -> AgentResult<()> {
        let url = Url::parse(raw)
            .map_err(|e| AgentError::Config(format!("{} is not a valid URL ('{}'): {}", key, raw, e)))?;

        match url.scheme() {
            "https" => Ok(()),
            "http" => {
                warn!("{} uses plain http: {}", key, raw);
                Ok(())
            }
            other => Err(AgentError::Config(format!(
                "{} must use http or https, got '{}'",
                key, other
            ))),
        }
    }
}
