use axum::extract::{Extension, State};
use axum::Json;
use common_http_errors::{ApiError, ApiResult};
use common_security::{
    ensure_any_granted, AuthorizeGate, Decision, SecurityContext, SecurityCtxExtractor,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;

/// Requirements to check the caller against, each a comma separated list.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeRequest {
    #[serde(default)]
    pub if_any_granted: Option<String>,
    #[serde(default)]
    pub if_all_granted: Option<String>,
    #[serde(default)]
    pub if_not_granted: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    pub decision: Decision,
    pub principal: Option<String>,
    pub trace_id: Option<Uuid>,
}

pub async fn authorize(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    Json(payload): Json<AuthorizeRequest>,
) -> ApiResult<Json<AuthorizeResponse>> {
    let gate = AuthorizeGate::from_lists(
        payload.if_any_granted.as_deref(),
        payload.if_all_granted.as_deref(),
        payload.if_not_granted.as_deref(),
    )
    .map_err(|err| ApiError::BadRequest {
        code: "invalid_authorization_config",
        trace_id: ctx.trace_id,
        message: Some(err.to_string()),
    })?;

    let outcome = gate.evaluate(&ctx);
    state.metrics.record(&outcome);
    let decision = outcome.map_err(|err| err.into_api_error(ctx.trace_id))?;

    Ok(Json(AuthorizeResponse {
        decision,
        principal: ctx.principal().map(str::to_owned),
        trace_id: ctx.trace_id,
    }))
}

/// Content behind the configured gate; only reached on `Decision::Render`.
pub async fn teller(Extension(ctx): Extension<SecurityContext>) -> String {
    format!("teller desk for {}", ctx.principal().unwrap_or("anonymous"))
}

pub async fn ledger(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
) -> ApiResult<String> {
    let outcome = ensure_any_granted(&ctx, &state.ledger_authorities).map(|()| Decision::Render);
    state.metrics.record(&outcome);
    outcome.map_err(|err| err.into_api_error(ctx.trace_id))?;
    Ok(format!("ledger for {}", ctx.principal().unwrap_or("anonymous")))
}
