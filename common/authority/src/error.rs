use thiserror::Error;

pub type AuthorityResult<T> = Result<T, AuthorityError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// A held authority returned no name. This is a fault in whatever built
    /// the authentication, so it is never treated as a plain non-match.
    #[error("granted authority at position {index} has no name")]
    InvalidAuthority { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("authority list '{0}' contains no authority names")]
    EmptyAuthorities(String),
    #[error("at least one of if_any_granted, if_all_granted or if_not_granted must be set")]
    NoRequirements,
}
