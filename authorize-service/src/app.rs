use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use common_authority::RequiredAuthorities;
use common_http_errors::ApiError;
use common_security::{require_gate, AuthzMetrics, GateGuard};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::authorize_handlers::{authorize, ledger, teller};
use crate::config::ServiceConfig;

#[derive(Clone)]
pub struct AppState {
    pub guard: GateGuard,
    pub metrics: AuthzMetrics,
    pub ledger_authorities: Arc<RequiredAuthorities>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let metrics = AuthzMetrics::new()?;
        let guard = GateGuard::new(config.gate.clone()).with_metrics(metrics.clone());
        Ok(Self {
            guard,
            metrics,
            ledger_authorities: Arc::new(config.ledger_authorities.clone()),
        })
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(text) => {
            let mut resp = text.into_response();
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            resp
        }
        Err(err) => {
            warn!(error = %err, "Unable to render metrics");
            ApiError::internal(err, None).into_response()
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/teller", get(teller))
        .layer(middleware::from_fn_with_state(state.guard.clone(), require_gate));

    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/authorize", post(authorize))
        .route("/ledger", get(ledger))
        .merge(gated)
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                trace_id = tracing::field::Empty,
                principal = tracing::field::Empty,
            )
        }))
}
