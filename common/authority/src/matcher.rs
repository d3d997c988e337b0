use smallvec::SmallVec;

use crate::authority::GrantedAuthority;
use crate::error::{AuthorityError, AuthorityResult};
use crate::required::RequiredAuthorities;

/// Names of the held authorities, in the order they were granted.
pub type GrantedNames<'a> = SmallVec<[&'a str; 8]>;

/// Extract every held authority name.
///
/// All authorities are inspected before any matching happens, so a nameless
/// authority is reported even when another one would have matched.
pub fn granted_names<A: GrantedAuthority>(held: &[A]) -> AuthorityResult<GrantedNames<'_>> {
    held.iter()
        .enumerate()
        .map(|(index, authority)| {
            authority
                .authority()
                .ok_or(AuthorityError::InvalidAuthority { index })
        })
        .collect()
}

/// True when at least one held authority is named in `required`.
pub fn is_any_granted<A: GrantedAuthority>(
    required: &RequiredAuthorities,
    held: &[A],
) -> AuthorityResult<bool> {
    let names = granted_names(held)?;
    Ok(names.iter().any(|name| required.contains(name)))
}

/// True when every name in `required` is held.
pub fn is_all_granted<A: GrantedAuthority>(
    required: &RequiredAuthorities,
    held: &[A],
) -> AuthorityResult<bool> {
    let names = granted_names(held)?;
    Ok(required
        .iter()
        .all(|name| names.iter().any(|held| *held == name)))
}

/// True when no held authority is named in `required`.
pub fn is_none_granted<A: GrantedAuthority>(
    required: &RequiredAuthorities,
    held: &[A],
) -> AuthorityResult<bool> {
    is_any_granted(required, held).map(|any| !any)
}
