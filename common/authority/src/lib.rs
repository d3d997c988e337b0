pub mod authority;
pub mod error;
pub mod matcher;
pub mod required;

pub use authority::{GrantedAuthority, SimpleAuthority};
pub use error::{AuthorityError, AuthorityResult, ConfigError};
pub use matcher::{granted_names, is_all_granted, is_any_granted, is_none_granted};
pub use required::RequiredAuthorities;
