//! Supervisor
//!
//! The single query entry point. Dispatches an explicit task directly, or
//! asks the decision service to analyze the input and follows up with at
//! most one heuristic call. Always returns a well-formed envelope.

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use crate::agent::{new_trace_id, AgentResult, Parameters, QueryRequest, QueryResponse};
use crate::config::AgentConfig;
use crate::orchestrator::router::suggest_next_action;
use crate::tools::{CallOutcome, ToolRegistry};
use crate::utils::{truncate_chars, truncate_json};

pub const DECISION_TASK: &str = "decision.analyze_situation";
pub const DECISION_FAILED_NOTE: &str = "decision analysis failed";
pub const TASK_FAILED_NOTE: &str = "task dispatch failed";

pub struct Supervisor {
    tools: Arc<ToolRegistry>,
    result_byte_limit: usize,
    input_echo_limit: usize,
    fallback_on_task_failure: bool,
}

impl Supervisor {
    pub fn new(config: &AgentConfig, tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            result_byte_limit: config.result_byte_limit,
            input_echo_limit: config.input_echo_limit,
            fallback_on_task_failure: config.fallback_on_task_failure,
        }
    }

    /// Supervisor over the standard HTTP tool registry.
    pub fn from_config(config: &AgentConfig) -> AgentResult<Self> {
        let tools = Arc::new(ToolRegistry::from_config(config)?);
        Ok(Self::new(config, tools))
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub async fn handle(&self, request: QueryRequest) -> QueryResponse {
        self.query(&request.input, request.task.as_deref(), request.parameters)
            .await
    }

    /// Process a single request. Never fails: every fault ends up in `errors`.
    pub async fn query(
        &self,
        input: &str,
        task: Option<&str>,
        parameters: Option<Parameters>,
    ) -> QueryResponse {
        let trace_id = new_trace_id();
        let span = info_span!("query", trace_id = %trace_id);
        let task = task.filter(|t| !t.is_empty());

        self.run(trace_id, input, task, parameters.unwrap_or_default())
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        trace_id: String,
        input: &str,
        task: Option<&str>,
        params: Parameters,
    ) -> QueryResponse {
        let mut response = QueryResponse::new(trace_id.clone(), input);
        info!(task = task.unwrap_or(""), input_len = input.len(), "query received");

        if let Some(task) = task {
            response.routed_task = task.to_string();
            match self.attempt(&mut response, task, &params, params.clone(), &trace_id).await {
                Some(CallOutcome::Ok(result)) => {
                    response.output = result;
                    return self.finish(response);
                }
                failed => {
                    if !self.fallback_on_task_failure {
                        response.output = failed
                            .map(CallOutcome::into_value)
                            .unwrap_or_else(|| json!({ "note": TASK_FAILED_NOTE }));
                        return self.finish(response);
                    }
                    info!(task, "explicit task failed; falling back to decision analysis");
                }
            }
        }

        let mut decision_params = Parameters::new();
        decision_params.insert("context".to_string(), Value::String(input.to_string()));
        let mut recorded_params = Parameters::new();
        recorded_params.insert(
            "context".to_string(),
            Value::String(truncate_chars(input, self.input_echo_limit)),
        );

        let decision = match self
            .attempt(&mut response, DECISION_TASK, &decision_params, recorded_params, &trace_id)
            .await
        {
            Some(CallOutcome::Ok(decision)) => decision,
            _ => {
                response.output = json!({ "note": DECISION_FAILED_NOTE });
                return self.finish(response);
            }
        };

        if let Some(next) = suggest_next_action(&decision, Utc::now()) {
            if task.is_none() {
                response.routed_task = next.task.clone();
            }
            self.attempt(&mut response, &next.task, &next.parameters, next.parameters.clone(), &trace_id)
                .await;
        }

        response.output = decision;
        self.finish(response)
    }

    /// Dispatch one call and record it.
    ///
    /// Routing errors produce an error record and no tool call. Attempted
    /// calls always produce a tool call record, plus an error record when
    /// the outcome is a failure.
    async fn attempt(
        &self,
        response: &mut QueryResponse,
        task: &str,
        params: &Parameters,
        recorded_params: Parameters,
        trace_id: &str,
    ) -> Option<CallOutcome> {
        let outcome = match self.tools.dispatch(task, params, trace_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(task, "dispatch rejected: {}", e);
                response.record_error(task, e.to_string());
                return None;
            }
        };

        response.record_call(
            task,
            recorded_params,
            truncate_json(outcome.value(), self.result_byte_limit),
        );
        if let Some(message) = outcome.failure_message() {
            warn!(task, "call failed: {}", message);
            response.record_error(task, message);
        }
        Some(outcome)
    }

    fn finish(&self, response: QueryResponse) -> QueryResponse {
        info!(
            routed_task = %response.routed_task,
            tool_calls = response.tool_calls.len(),
            errors = response.errors.len(),
            "query finished"
        );
        response
    }
}
