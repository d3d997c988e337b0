use common_authority::{is_any_granted, RequiredAuthorities};
use tracing::warn;

use crate::context::SecurityContext;
use crate::SecurityError;

/// Handler-level check: succeed when the principal holds any of `required`.
pub fn ensure_any_granted(
    ctx: &SecurityContext,
    required: &RequiredAuthorities,
) -> Result<(), SecurityError> {
    if is_any_granted(required, ctx.granted_authorities())? {
        return Ok(());
    }
    warn!(
        principal = ctx.principal().unwrap_or("anonymous"),
        trace_id = ?ctx.trace_id,
        required = %required,
        "any_authority_check_failed"
    );
    Err(SecurityError::Forbidden { required: required.to_vec() })
}
