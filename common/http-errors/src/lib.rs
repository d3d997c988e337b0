use axum::{http::{StatusCode, HeaderValue}, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")] pub required_authorities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")] pub trace_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")] pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Caller lacks the authorities the gate asks for.
    Forbidden { required: Vec<String>, trace_id: Option<Uuid> },
    /// The caller's authentication carries an authority without a name.
    InvalidAuthority { trace_id: Option<Uuid>, message: Option<String> },
    BadRequest { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    Internal { trace_id: Option<Uuid>, message: Option<String> },
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E, trace_id: Option<Uuid>) -> Self { Self::Internal { trace_id, message: Some(e.to_string()) } }
    pub fn forbidden(required: Vec<String>, trace_id: Option<Uuid>) -> Self { Self::Forbidden { required, trace_id } }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Forbidden { .. } => "forbidden",
            ApiError::InvalidAuthority { .. } => "invalid_authority",
            ApiError::BadRequest { code, .. } => *code,
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_code = self.code();
        let (status, body) = match self {
            ApiError::Forbidden { required, trace_id } => (
                StatusCode::FORBIDDEN,
                ErrorBody { code: error_code.into(), required_authorities: required, trace_id, message: None },
            ),
            ApiError::InvalidAuthority { trace_id, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { code: error_code.into(), required_authorities: Vec::new(), trace_id, message },
            ),
            ApiError::BadRequest { trace_id, message, .. } => (
                StatusCode::BAD_REQUEST,
                ErrorBody { code: error_code.into(), required_authorities: Vec::new(), trace_id, message },
            ),
            ApiError::Internal { trace_id, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody { code: error_code.into(), required_authorities: Vec::new(), trace_id, message },
            ),
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
