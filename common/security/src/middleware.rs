use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use common_http_errors::ApiError;

use crate::context::SecurityCtxExtractor;
use crate::gate::{AuthorizeGate, Decision};
use crate::metrics::AuthzMetrics;
use crate::SecurityError;

/// State for [`require_gate`]: the gate protecting a router and where to
/// count its decisions.
#[derive(Clone)]
pub struct GateGuard {
    pub gate: Arc<AuthorizeGate>,
    pub metrics: Option<AuthzMetrics>,
}

impl GateGuard {
    pub fn new(gate: AuthorizeGate) -> Self {
        Self {
            gate: Arc::new(gate),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: AuthzMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// Filter requests through a gate. The context is taken from the request
/// extensions when an outer layer set one, otherwise from the identity
/// headers. `Render` passes the request on with the
/// [`SecurityContext`](crate::SecurityContext) in the extensions, `Skip`
/// answers 403 and a nameless authority answers 500.
pub async fn require_gate(
    State(guard): State<GateGuard>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let outcome = guard.gate.evaluate(&ctx);
    if let Some(metrics) = &guard.metrics {
        metrics.record(&outcome);
    }

    match outcome {
        Ok(Decision::Render) => {
            req.extensions_mut().insert(ctx);
            Ok(next.run(req).await)
        }
        Ok(Decision::Skip) => Err(SecurityError::Forbidden {
            required: guard.gate.required_names(),
        }
        .into_api_error(ctx.trace_id)),
        Err(err) => Err(err.into_api_error(ctx.trace_id)),
    }
}
