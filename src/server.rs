use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::{QueryRequest, QueryResponse};
use crate::orchestrator::Supervisor;
use crate::tools::ToolDescriptor;

struct ServerError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid query request: {}", rejection.body_text()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub supervisor: Arc<Supervisor>,
    pub project_id: String,
    pub location: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .route("/health", get(health_handler))
        .route("/tools", get(tools_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn query_handler(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ServerError> {
    let Json(request) = payload?;
    Ok(Json(state.supervisor.handle(request).await))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "project": state.project_id,
        "location": state.location,
    }))
}

async fn tools_handler(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    Json(state.supervisor.tools().describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::tools::mock::MockTransport;
    use crate::tools::{CallOutcome, ToolRegistry};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(transport: Arc<MockTransport>) -> Router {
        let config = AgentConfig::default().with_base_url("https://tools.test");
        let tools = Arc::new(ToolRegistry::with_standard_tools(&config, transport));
        router(AppState {
            supervisor: Arc::new(Supervisor::new(&config, tools)),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_query_route_returns_envelope() {
        let transport = Arc::new(MockTransport::new().respond(
            "https://tools.test/driveTool",
            CallOutcome::Ok(json!({"files": ["a.pdf"]})),
        ));
        let request = Request::post("/query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"input":"list","task":"drive.list_files"}"#))
            .unwrap();

        let response = app(transport).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["routedTask"], "drive.list_files");
        assert_eq!(body["output"]["files"][0], "a.pdf");
        assert_eq!(body["toolCalls"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"], json!([]));
    }

    #[tokio::test]
    async fn test_query_route_failure_still_ok_status() {
        let request = Request::post("/query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"input":"x","task":"nope.nothing"}"#))
            .unwrap();

        let response = app(Arc::new(MockTransport::new())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["task"], "nope.nothing");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let request = Request::post("/query")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app(Arc::new(MockTransport::new())).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query request"));
    }

    #[tokio::test]
    async fn test_health_and_tools_routes() {
        let health = app(Arc::new(MockTransport::new()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(health).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["project"], "smartmeet-470807");

        let tools = app(Arc::new(MockTransport::new()))
            .oneshot(Request::get("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(tools).await;
        assert_eq!(body.as_array().unwrap().len(), 6);
    }
}
