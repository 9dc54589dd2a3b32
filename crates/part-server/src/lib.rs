use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::{Method, StatusCode};
use part_ai::{
    BuildReport, DEFAULT_VOLUME_RESOLUTION, ErrorKind, GenerationResult, PartError, Pipeline,
    Recovery, build_with_sdf,
};
use part_library::ParamSpec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

const MAX_RESOLUTION: usize = 128;

pub fn app() -> Router {
    app_with(Pipeline::default())
}

pub fn app_with(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/primitives", get(primitives))
        .route("/prompt", get(prompt))
        .route("/classify", post(classify))
        .route("/build", post(build))
        .layer(cors_layer())
        .with_state(Arc::new(pipeline))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

type SharedPipeline = State<Arc<Pipeline>>;

#[derive(Debug, Deserialize)]
struct TextRequest {
    text: String,
    resolution: Option<usize>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct PrimitiveResponse {
    name: &'static str,
    signature: String,
    summary: &'static str,
    params: &'static [ParamSpec],
}

#[derive(Debug, Serialize)]
struct PromptResponse {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recovery: Option<Recovery>,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    kind: Option<ErrorKind>,
    recovery: Option<Recovery>,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: None,
            recovery: None,
            message: message.into(),
        }
    }
}

impl From<PartError> for ApiError {
    fn from(error: PartError) -> Self {
        let status = match error.kind() {
            ErrorKind::AmbiguousRequest
            | ErrorKind::UnsupportedRequest
            | ErrorKind::NoValidCall
            | ErrorKind::InvalidParameters => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ExecutionFailure => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Generator => StatusCode::BAD_GATEWAY,
        };
        let message = error
            .user_message()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        Self {
            status,
            kind: Some(error.kind()),
            recovery: Some(error.recovery()),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                kind: self.kind,
                recovery: self.recovery,
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn primitives(State(pipeline): SharedPipeline) -> Json<Vec<PrimitiveResponse>> {
    let listing = pipeline
        .registry()
        .iter()
        .map(|spec| PrimitiveResponse {
            name: spec.name,
            signature: spec.signature(),
            summary: spec.summary,
            params: spec.params,
        })
        .collect();
    Json(listing)
}

async fn prompt(State(pipeline): SharedPipeline) -> Json<PromptResponse> {
    Json(PromptResponse {
        prompt: pipeline.system_prompt().to_string(),
    })
}

async fn classify(
    State(pipeline): SharedPipeline,
    body: Bytes,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let request: TextRequest = parse_json(&body)?;
    let result = pipeline.classify(&request.text);
    let outcome = result.label();
    let response = match result {
        GenerationResult::Ready { code } => ClassifyResponse {
            outcome,
            code: Some(code),
            message: None,
        },
        GenerationResult::Ambiguous { message } | GenerationResult::Unsupported { message } => {
            ClassifyResponse {
                outcome,
                code: None,
                message: Some(message),
            }
        }
        GenerationResult::Malformed { error, .. } => ClassifyResponse {
            outcome,
            code: None,
            message: Some(error.to_string()),
        },
    };
    Ok(Json(response))
}

async fn build(
    State(pipeline): SharedPipeline,
    body: Bytes,
) -> Result<Json<BuildReport>, ApiError> {
    let request: TextRequest = parse_json(&body)?;
    let resolution = resolve_resolution(request.resolution)?;

    let report = build_with_sdf(&pipeline, &request.text, resolution).map_err(|err| {
        warn!(kind = err.kind().as_str(), error = %err, "build request failed");
        ApiError::from(err)
    })?;
    info!(call = report.call, "build request served");
    Ok(Json(report))
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("request body is required"));
    }

    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))
}

fn resolve_resolution(value: Option<usize>) -> Result<usize, ApiError> {
    let resolution = value.unwrap_or(DEFAULT_VOLUME_RESOLUTION);
    if !(2..=MAX_RESOLUTION).contains(&resolution) {
        return Err(ApiError::bad_request(format!(
            "resolution must be between 2 and {MAX_RESOLUTION}"
        )));
    }
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::response::Response;
    use http::header::{CONTENT_TYPE, ORIGIN};
    use http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use super::app;

    #[tokio::test]
    async fn health_reports_ok() {
        let response = send_empty(app(), Method::GET, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = parse_json_value(response).await;
        assert_eq!(payload["status"], "ok");
    }

    #[tokio::test]
    async fn primitives_lists_the_registry() {
        let response = send_empty(app(), Method::GET, "/primitives").await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = parse_json_value(response).await;
        let entries = payload.as_array().expect("array of primitives");
        assert_eq!(entries.len(), 24);
        let flange = entries
            .iter()
            .find(|entry| entry["name"] == "make_flange")
            .expect("flange is listed");
        assert_eq!(
            flange["signature"],
            "make_flange(outer_d, inner_d, thickness, bolt_circle_d=0.0, bolt_hole_d=0.0, bolt_count=0)"
        );
    }

    #[tokio::test]
    async fn prompt_is_served() {
        let response = send_empty(app(), Method::GET, "/prompt").await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = parse_json_value(response).await;
        let prompt = payload["prompt"].as_str().expect("prompt text");
        assert!(prompt.contains("UNSUPPORTED_PART:"));
        assert!(prompt.contains("make_v_pulley("));
    }

    #[tokio::test]
    async fn classify_reports_marker_outcomes() {
        let response = send_json(
            app(),
            Method::POST,
            "/classify",
            json!({"text": "NEED_CLARIFICATION: spur or helical?"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let payload = parse_json_value(response).await;
        assert_eq!(payload["outcome"], "ambiguous");
        assert_eq!(payload["message"], "spur or helical?");
    }

    #[tokio::test]
    async fn classify_normalizes_ready_code() {
        let response = send_json(
            app(),
            Method::POST,
            "/classify",
            json!({"text": "Part.show(make_cylinder(5, 20))"}),
        )
        .await;
        let payload = parse_json_value(response).await;
        assert_eq!(payload["outcome"], "ready");
        assert_eq!(payload["code"], "shape = make_cylinder(5, 20)\nPart.show(shape)");
    }

    #[tokio::test]
    async fn build_returns_report() {
        let response = send_json(
            app(),
            Method::POST,
            "/build",
            json!({"text": "shape = make_flange(80,40,8,60,8,6)\nPart.show(shape)", "resolution": 16}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let payload = parse_json_value(response).await;
        assert_eq!(payload["call"], "make_flange");
        assert_eq!(payload["code"], "shape = make_flange(80,40,8,60,8,6)\nPart.show(shape)");
        assert_eq!(payload["bounds"]["max"][2], 8.0);
        assert_eq!(payload["recipe"]["op"], "cut");
        assert!(payload["volume"].as_f64().expect("volume") > 0.0);
    }

    #[tokio::test]
    async fn build_maps_failures_to_kinds() {
        let response = send_json(
            app(),
            Method::POST,
            "/build",
            json!({"text": "UNSUPPORTED_PART: banana shape"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = parse_json_value(response).await;
        assert_eq!(payload["kind"], "unsupported_request");
        assert_eq!(payload["recovery"], "reprompt_user");
        assert_eq!(payload["error"], "banana shape");

        let response = send_json(
            app(),
            Method::POST,
            "/build",
            json!({"text": "make_rect_tube(100, 10, 10, 6)"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = parse_json_value(response).await;
        assert_eq!(payload["kind"], "invalid_parameters");
        assert_eq!(payload["recovery"], "retry_generation");
    }

    #[tokio::test]
    async fn malformed_requests_are_bad_requests() {
        let response = send_json(app(), Method::POST, "/build", json!({"code": "x"})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send_json(
            app(),
            Method::POST,
            "/build",
            json!({"text": "make_box(1, 2, 3)", "resolution": 1}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send_empty(app(), Method::POST, "/classify").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = parse_json_value(response).await;
        assert_eq!(payload["error"], "request body is required");
        assert!(payload.get("kind").is_none());
    }

    #[tokio::test]
    async fn cors_headers_are_present() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .header(ORIGIN, "https://example.com")
            .body(Body::empty())
            .expect("request should build");

        let response = app()
            .oneshot(request)
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::OK);
        let allow_origin = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert_eq!(allow_origin, "*");
    }

    async fn send_json(
        router: Router,
        method: Method,
        uri: &str,
        value: serde_json::Value,
    ) -> Response {
        let body = serde_json::to_vec(&value).expect("json encoding should succeed");
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request should build");

        router
            .oneshot(request)
            .await
            .expect("request should complete")
    }

    async fn send_empty(router: Router, method: Method, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request should build");

        router
            .oneshot(request)
            .await
            .expect("request should complete")
    }

    async fn parse_json_value(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body should collect")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("response should decode as JSON")
    }
}
