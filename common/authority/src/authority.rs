use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An authority granted to an authenticated principal.
///
/// Implementations may be backed by anything (a role name, a scope claim, a
/// permission row). Returning `None` means the authority cannot be expressed
/// as a name; matchers reject such an authority instead of skipping it.
pub trait GrantedAuthority: fmt::Debug + Send + Sync {
    fn authority(&self) -> Option<&str>;
}

/// Plain named authority, e.g. `ROLE_TELLER`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimpleAuthority(String);

impl SimpleAuthority {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GrantedAuthority for SimpleAuthority {
    fn authority(&self) -> Option<&str> {
        Some(&self.0)
    }
}

impl From<&str> for SimpleAuthority {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SimpleAuthority {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SimpleAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<T: GrantedAuthority + ?Sized> GrantedAuthority for &T {
    fn authority(&self) -> Option<&str> {
        (**self).authority()
    }
}

impl<T: GrantedAuthority + ?Sized> GrantedAuthority for Box<T> {
    fn authority(&self) -> Option<&str> {
        (**self).authority()
    }
}

impl<T: GrantedAuthority + ?Sized> GrantedAuthority for Arc<T> {
    fn authority(&self) -> Option<&str> {
        (**self).authority()
    }
}
