use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};
use common_authority::{GrantedAuthority, SimpleAuthority};
use common_http_errors::ApiError;
use tracing::{debug, Span};
use uuid::Uuid;

pub const USER_HEADER: &str = "X-User-ID";
pub const ROLES_HEADER: &str = "X-Roles";
pub const TRACE_HEADER: &str = "X-Trace-ID";

/// An authenticated principal and the authorities granted to it.
///
/// Authorities are fixed at construction time.
#[derive(Debug, Clone)]
pub struct Authentication {
    principal: String,
    authorities: Arc<[Arc<dyn GrantedAuthority>]>,
}

impl Authentication {
    pub fn new<I, A>(principal: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: GrantedAuthority + 'static,
    {
        let authorities = authorities
            .into_iter()
            .map(|authority| Arc::new(authority) as Arc<dyn GrantedAuthority>)
            .collect();
        Self {
            principal: principal.into(),
            authorities,
        }
    }

    /// Build from authorities that are already shared trait objects, e.g. a
    /// mix of custom implementations.
    pub fn from_shared(
        principal: impl Into<String>,
        authorities: Vec<Arc<dyn GrantedAuthority>>,
    ) -> Self {
        Self {
            principal: principal.into(),
            authorities: authorities.into(),
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn authorities(&self) -> &[Arc<dyn GrantedAuthority>] {
        &self.authorities
    }
}

/// Per-request security state. Built when a request enters, dropped when it
/// leaves; nothing here is shared between requests.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
    pub trace_id: Option<Uuid>,
}

impl SecurityContext {
    pub fn new(authentication: Option<Authentication>, trace_id: Option<Uuid>) -> Self {
        Self {
            authentication,
            trace_id,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(authentication: Authentication) -> Self {
        Self::new(Some(authentication), None)
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn clear(&mut self) {
        self.authentication = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    pub fn principal(&self) -> Option<&str> {
        self.authentication.as_ref().map(Authentication::principal)
    }

    /// Authorities of the current principal; empty when unauthenticated.
    pub fn granted_authorities(&self) -> &[Arc<dyn GrantedAuthority>] {
        self.authentication
            .as_ref()
            .map(Authentication::authorities)
            .unwrap_or(&[])
    }
}

pub struct SecurityCtxExtractor(pub SecurityContext);

fn principal_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn roles_from_headers(headers: &HeaderMap) -> Result<Vec<SimpleAuthority>, ApiError> {
    let Some(raw) = headers.get(ROLES_HEADER) else {
        return Ok(Vec::new());
    };
    let csv = raw.to_str().map_err(|_| ApiError::BadRequest {
        code: "invalid_roles_header",
        trace_id: None,
        message: Some(format!("{ROLES_HEADER} header is not valid text")),
    })?;

    Ok(csv
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SimpleAuthority::from)
        .collect())
}

fn trace_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(TRACE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
}

/// Build the request's context from headers set by the authenticating proxy.
pub fn context_from_headers(headers: &HeaderMap) -> Result<SecurityContext, ApiError> {
    let trace_id = trace_id_from_headers(headers).unwrap_or_else(Uuid::new_v4);
    let roles = roles_from_headers(headers).map_err(|err| match err {
        ApiError::BadRequest { code, message, .. } => ApiError::BadRequest {
            code,
            trace_id: Some(trace_id),
            message,
        },
        other => other,
    })?;

    let authentication = match principal_from_headers(headers) {
        Some(principal) => Some(Authentication::new(principal, roles)),
        None => {
            if !roles.is_empty() {
                debug!(%trace_id, "ignoring roles supplied without a principal");
            }
            None
        }
    };

    Ok(SecurityContext::new(authentication, Some(trace_id)))
}

#[async_trait]
impl<S> FromRequestParts<S> for SecurityCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // An authentication layer further out may already have placed the
        // context; headers are only read when it did not.
        let ctx = match parts.extensions.get::<SecurityContext>() {
            Some(ctx) => ctx.clone(),
            None => context_from_headers(&parts.headers)?,
        };

        if let Some(tid) = ctx.trace_id.as_ref() {
            Span::current().record("trace_id", tracing::field::display(tid));
        }
        if let Some(principal) = ctx.principal() {
            Span::current().record("principal", principal);
        }

        Ok(SecurityCtxExtractor(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn headers_build_authenticated_context() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("abc"));
        headers.insert(ROLES_HEADER, HeaderValue::from_static("ROLE_TELLER, ROLE_USER,"));

        let ctx = context_from_headers(&headers).expect("context");
        assert_eq!(ctx.principal(), Some("abc"));
        let names: Vec<_> = ctx
            .granted_authorities()
            .iter()
            .map(|a| a.authority().unwrap())
            .collect();
        assert_eq!(names, vec!["ROLE_TELLER", "ROLE_USER"]);
        assert!(ctx.trace_id.is_some());
    }

    #[test]
    fn missing_principal_yields_anonymous_context() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLES_HEADER, HeaderValue::from_static("ROLE_ADMIN"));

        let ctx = context_from_headers(&headers).expect("context");
        assert!(!ctx.is_authenticated());
        assert!(ctx.granted_authorities().is_empty());
    }

    #[test]
    fn supplied_trace_id_is_kept() {
        let trace = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_HEADER, HeaderValue::from_str(&trace.to_string()).unwrap());

        let ctx = context_from_headers(&headers).expect("context");
        assert_eq!(ctx.trace_id, Some(trace));
    }

    #[test]
    fn non_text_roles_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("abc"));
        headers.insert(ROLES_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        let err = context_from_headers(&headers).expect_err("should reject");
        assert!(matches!(err, ApiError::BadRequest { code: "invalid_roles_header", .. }));
    }

    #[test]
    fn clear_drops_authentication() {
        let mut ctx = SecurityContext::authenticated(Authentication::new(
            "abc",
            [SimpleAuthority::new("ROLE_TELLER")],
        ));
        assert_eq!(ctx.granted_authorities().len(), 1);
        ctx.clear();
        assert!(ctx.principal().is_none());
        assert!(ctx.granted_authorities().is_empty());
    }
}
