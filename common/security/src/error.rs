use common_authority::{AuthorityError, ConfigError};
use common_http_errors::ApiError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("missing required authorities: {}", .required.join(", "))]
    Forbidden { required: Vec<String> },
    #[error(transparent)]
    InvalidAuthority(#[from] AuthorityError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SecurityError {
    pub fn into_api_error(self, trace_id: Option<Uuid>) -> ApiError {
        match self {
            SecurityError::Forbidden { required } => ApiError::Forbidden { required, trace_id },
            SecurityError::InvalidAuthority(err) => ApiError::InvalidAuthority {
                trace_id,
                message: Some(err.to_string()),
            },
            SecurityError::Config(err) => ApiError::BadRequest {
                code: "invalid_authorization_config",
                trace_id,
                message: Some(err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_api_errors() {
        let err = SecurityError::from(AuthorityError::InvalidAuthority { index: 2 });
        assert!(matches!(err.into_api_error(None), ApiError::InvalidAuthority { .. }));

        let err = SecurityError::Forbidden { required: vec!["ROLE_TELLER".into()] };
        assert_eq!(err.to_string(), "missing required authorities: ROLE_TELLER");
        assert!(matches!(err.into_api_error(None), ApiError::Forbidden { .. }));

        let err = SecurityError::from(ConfigError::NoRequirements);
        assert_eq!(err.into_api_error(None).code(), "invalid_authorization_config");
    }
}
