use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Extension, Request as AxumRequest};
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use common_authority::{GrantedAuthority, SimpleAuthority};
use common_security::{
    require_gate, test_request_headers, Authentication, AuthorizeGate, AuthzMetrics, GateGuard,
    SecurityContext,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Debug)]
struct Nameless;

impl GrantedAuthority for Nameless {
    fn authority(&self) -> Option<&str> {
        None
    }
}

async fn whoami(Extension(ctx): Extension<SecurityContext>) -> String {
    ctx.principal().unwrap_or("anonymous").to_string()
}

fn app(gate: AuthorizeGate, metrics: AuthzMetrics) -> Router {
    let guard = GateGuard::new(gate).with_metrics(metrics);
    Router::new()
        .route("/teller", get(whoami))
        .layer(middleware::from_fn_with_state(guard, require_gate))
}

/// Wrap the gated app in an outer layer that authenticates every request as
/// `ctx`, the way an upstream authentication layer would.
fn app_with_context(gate: AuthorizeGate, metrics: AuthzMetrics, ctx: SecurityContext) -> Router {
    app(gate, metrics).layer(middleware::from_fn(move |mut req: AxumRequest, next: Next| {
        let ctx = ctx.clone();
        async move {
            req.extensions_mut().insert(ctx);
            let resp: Response = next.run(req).await;
            resp
        }
    }))
}

fn request() -> Request<Body> {
    Request::builder().uri("/teller").body(Body::empty()).unwrap()
}

#[tokio::test]
async fn renders_for_granted_authority() {
    let metrics = AuthzMetrics::new().unwrap();
    let app = app(AuthorizeGate::any_of("ROLE_TELLER").unwrap(), metrics.clone());

    let mut req = request();
    test_request_headers!(req, roles = "ROLE_USER,ROLE_TELLER", user = "abc");
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"abc");
    assert_eq!(metrics.decision_count("render"), 1);
}

#[tokio::test]
async fn forbids_missing_authority() {
    let metrics = AuthzMetrics::new().unwrap();
    let app = app(AuthorizeGate::any_of("ROLE_TELLER").unwrap(), metrics.clone());

    let mut req = request();
    test_request_headers!(req, roles = "ROLE_USER", user = "abc");
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "forbidden");
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["required_authorities"], serde_json::json!(["ROLE_TELLER"]));
    assert!(json["trace_id"].is_string());
    assert_eq!(metrics.decision_count("skip"), 1);
}

#[tokio::test]
async fn forbids_anonymous_request() {
    let app = app(AuthorizeGate::any_of("ROLE_TELLER").unwrap(), AuthzMetrics::new().unwrap());
    let resp = app.oneshot(request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn not_granted_gate_lets_anonymous_through() {
    let gate = AuthorizeGate::from_lists(None, None, Some("ROLE_SUSPENDED")).unwrap();
    let app = app(gate, AuthzMetrics::new().unwrap());

    let resp = app.oneshot(request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn suspended_user_is_forbidden_by_not_granted_gate() {
    let gate = AuthorizeGate::from_lists(Some("ROLE_TELLER"), None, Some("ROLE_SUSPENDED")).unwrap();
    let app = app(gate, AuthzMetrics::new().unwrap());

    let mut req = request();
    test_request_headers!(req, roles = "ROLE_TELLER,ROLE_SUSPENDED", user = "abc");
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejects_roles_header_that_is_not_text() {
    let app = app(AuthorizeGate::any_of("ROLE_TELLER").unwrap(), AuthzMetrics::new().unwrap());

    let mut req = request();
    test_request_headers!(req, user = "abc");
    req.headers_mut().insert(
        "X-Roles",
        axum::http::HeaderValue::from_bytes(&[0xff]).unwrap(),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_roles_header");
}

#[tokio::test]
async fn nameless_authority_is_a_server_error() {
    let metrics = AuthzMetrics::new().unwrap();
    let trace = Uuid::new_v4();
    let authorities: Vec<Arc<dyn GrantedAuthority>> =
        vec![Arc::new(SimpleAuthority::new("ROLE_TELLER")), Arc::new(Nameless)];
    let ctx = SecurityContext::new(Some(Authentication::from_shared("abc", authorities)), Some(trace));
    let app = app_with_context(AuthorizeGate::any_of("ROLE_TELLER").unwrap(), metrics.clone(), ctx);

    let resp = app.oneshot(request()).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_authority");
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["trace_id"], trace.to_string());
    assert_eq!(metrics.decision_count("invalid_authority"), 1);
    assert_eq!(metrics.decision_count("render"), 0);
}

#[tokio::test]
async fn context_from_outer_layer_wins_over_headers() {
    let metrics = AuthzMetrics::new().unwrap();
    let ctx = SecurityContext::authenticated(Authentication::new(
        "session-user",
        [SimpleAuthority::new("ROLE_TELLER")],
    ));
    let app = app_with_context(AuthorizeGate::any_of("ROLE_TELLER").unwrap(), metrics.clone(), ctx);

    let mut req = request();
    test_request_headers!(req, roles = "ROLE_USER", user = "header-user");
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"session-user");
    assert_eq!(metrics.decision_count("render"), 1);
}
