pub mod context;
pub mod error;
pub mod gate;
pub mod guards;
pub mod metrics;
pub mod middleware;
mod test_macros;

pub use context::{Authentication, SecurityContext, SecurityCtxExtractor};
pub use error::SecurityError;
pub use gate::{AuthorizeGate, AuthorizeGateBuilder, Decision};
pub use guards::ensure_any_granted;
pub use metrics::AuthzMetrics;
pub use middleware::{require_gate, GateGuard};
