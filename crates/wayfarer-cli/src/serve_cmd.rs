use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use wayfarer_core::agent::AgentRegistry;
use wayfarer_core::domain::ItineraryRequest;
use wayfarer_core::schema::DomainKind;

use crate::config::ServerConfig;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({ "detail": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    registry: Arc<AgentRegistry>,
    /// Cancelled on shutdown; each request gets a child token.
    shutdown: CancellationToken,
}

pub fn build_router(
    registry: Arc<AgentRegistry>,
    shutdown: CancellationToken,
    cors: CorsLayer,
) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/itinerary", post(itinerary))
        .route("/api/events", post(events))
        .route("/api/restaurants", post(restaurants))
        .route("/debug-itinerary", post(debug_itinerary))
        .layer(cors)
        .with_state(AppState { registry, shutdown })
}

pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(registry: AgentRegistry, server: &ServerConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    let app = build_router(
        Arc::new(registry),
        shutdown.clone(),
        cors_layer(&server.cors_origins)?,
    );

    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", server.bind, server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("wayfarer serve listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    tracing::info!("wayfarer serve shut down");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    shutdown.cancel();
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn itinerary(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, DomainKind::Itinerary, body).await
}

async fn events(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, DomainKind::Events, body).await
}

async fn restaurants(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    dispatch(&state, DomainKind::Restaurants, body).await
}

/// Run one request through the agent for `kind` and map its envelope to an
/// HTTP response: data with 200, or `{"detail"}` with 400 (500 when the
/// failure is unclassified).
async fn dispatch(
    state: &AppState,
    kind: DomainKind,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(body) = body?;
    let Value::Object(input) = body else {
        return Err(AppError::unprocessable("request body must be a JSON object"));
    };

    let agent = state
        .registry
        .get(kind)
        .ok_or_else(|| AppError::internal(format!("no agent registered for {kind}")))?;

    let envelope = agent
        .process_with_cancel(input, state.shutdown.child_token())
        .await;

    match envelope.failure_kind() {
        None => Ok(Json(envelope.into_data()).into_response()),
        Some(failure) => {
            let status = if failure.is_classified() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            Err(AppError {
                status,
                message: envelope.error().unwrap_or("request failed").to_string(),
            })
        }
    }
}

async fn debug_itinerary(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(received) = body?;
    tracing::info!("debug-itinerary received: {received}");

    let report = match serde_json::from_value::<ItineraryRequest>(received.clone()) {
        Ok(parsed) => json!({
            "received": received,
            "parsed": parsed,
            "validation": "success",
        }),
        Err(e) => json!({
            "received": received,
            "error": e.to_string(),
            "validation": "failed",
        }),
    };
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use wayfarer_core::agent::AgentRegistry;
    use wayfarer_core::config::GeneratorConfig;
    use wayfarer_core::generator::Generator;
    use wayfarer_test_utils::{
        EVENT_MISSING_CATEGORY, FailingGenerator, ONE_EVENT, PROSE, ScriptedGenerator,
        WRONG_CONTAINER, events_input, itinerary_input, itinerary_output, restaurants_input,
        restaurants_output,
    };

    use super::ServerConfig;

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn router(generator: Arc<dyn Generator>) -> axum::Router {
        let registry = AgentRegistry::standard(generator, &GeneratorConfig::new("test-key"));
        let origins: Vec<String> = ServerConfig::DEFAULT_CORS_ORIGINS
            .iter()
            .map(|o| o.to_string())
            .collect();
        super::build_router(
            Arc::new(registry),
            CancellationToken::new(),
            super::cors_layer(&origins).unwrap(),
        )
    }

    async fn post_raw(app: axum::Router, uri: &str, body: String) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn post_json(app: axum::Router, uri: &str, body: Value) -> axum::response::Response {
        post_raw(app, uri, body.to_string()).await
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_health() {
        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_events_success_returns_domain_data() {
        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = post_json(app, "/api/events", Value::Object(events_input())).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let events = json["events"].as_array().expect("events array");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["name"], "A");
        assert_eq!(events[0]["price"], 10.0);
        assert!(json.get("success").is_none(), "body is the domain shape, not the envelope");
    }

    #[tokio::test]
    async fn test_itinerary_and_restaurants_success() {
        let app = router(ScriptedGenerator::always(itinerary_output()));
        let resp = post_json(app, "/api/itinerary", Value::Object(itinerary_input())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["days"][0]["activities"][0]["name"], "Pike Place Market");

        let app = router(ScriptedGenerator::always(restaurants_output()));
        let resp = post_json(app, "/api/restaurants", Value::Object(restaurants_input())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["restaurants"][1]["opening_hours"], Value::Null);
    }

    #[tokio::test]
    async fn test_classified_failures_are_bad_request() {
        for raw in [WRONG_CONTAINER, EVENT_MISSING_CATEGORY, PROSE] {
            let app = router(ScriptedGenerator::always(raw));
            let resp = post_json(app, "/api/events", Value::Object(events_input())).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "raw: {raw}");
            let json = body_json(resp).await;
            assert!(json["detail"].is_string(), "raw: {raw}");
        }
    }

    #[tokio::test]
    async fn test_missing_container_detail_message() {
        let app = router(ScriptedGenerator::always(WRONG_CONTAINER));
        let resp = post_json(app, "/api/events", Value::Object(events_input())).await;
        let json = body_json(resp).await;
        assert_eq!(json["detail"], "missing 'events' array");
    }

    #[tokio::test]
    async fn test_missing_input_field_is_bad_request() {
        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = post_json(app, "/api/events", json!({ "location": "Seattle" })).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let detail = body_json(resp).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("event_date"), "detail: {detail}");
    }

    #[tokio::test]
    async fn test_omitted_defaulted_fields_succeed() {
        let app = router(ScriptedGenerator::always(restaurants_output()));
        let resp = post_json(app, "/api/restaurants", json!({ "date": "2024-04-01" })).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["restaurants"].as_array().unwrap().len(), 2);

        let app = router(ScriptedGenerator::always(restaurants_output()));
        let resp = post_json(app, "/api/restaurants", json!({ "location": "Portland" })).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await["detail"],
            "Invalid input data: missing required field(s): date"
        );
    }

    #[tokio::test]
    async fn test_generator_failure_is_bad_request() {
        let app = router(FailingGenerator::new(500, "boom"));
        let resp = post_json(app, "/api/events", Value::Object(events_input())).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_unprocessable() {
        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = post_raw(app, "/api/events", "{not json".to_string()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(resp).await["detail"].is_string());

        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = post_json(app, "/api/events", json!(["not", "an", "object"])).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_debug_itinerary_reports_parse_outcome() {
        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = post_json(app, "/debug-itinerary", Value::Object(itinerary_input())).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["validation"], "success");
        assert_eq!(json["parsed"]["days"], 2);

        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = post_json(app, "/debug-itinerary", json!({ "days": "three" })).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["validation"], "failed");
        assert_eq!(json["received"], json!({ "days": "three" }));
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = router(ScriptedGenerator::always(ONE_EVENT));
        let resp = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/events")
                    .header(header::ORIGIN, "http://localhost:9000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        assert!(super::cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
