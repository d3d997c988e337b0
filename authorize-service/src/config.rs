use anyhow::{Context, Result};
use common_authority::RequiredAuthorities;
use common_security::AuthorizeGate;
use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_PORT: u16 = 8090;
const DEFAULT_IF_ANY_GRANTED: &str = "ROLE_TELLER";
const DEFAULT_LEDGER_AUTHORITIES: &str = "ROLE_TELLER,ROLE_AUDITOR";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Gate guarding `/teller`.
    pub gate: AuthorizeGate,
    /// Authorities accepted by the `/ledger` handler check.
    pub ledger_authorities: RequiredAuthorities,
}

impl ServiceConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST '{}'", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

pub fn load_service_config() -> Result<ServiceConfig> {
    service_config_from(|key| env::var(key).ok())
}

/// Build the config from any key lookup; `load_service_config` passes the
/// process environment.
pub fn service_config_from<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("HOST")
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = match lookup("PORT").and_then(|value| normalize_optional(&value)) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid PORT '{value}'"))?,
        None => DEFAULT_PORT,
    };

    let mut if_any_granted = lookup("AUTHZ_IF_ANY_GRANTED").and_then(|value| normalize_optional(&value));
    let if_all_granted = lookup("AUTHZ_IF_ALL_GRANTED").and_then(|value| normalize_optional(&value));
    let if_not_granted = lookup("AUTHZ_IF_NOT_GRANTED").and_then(|value| normalize_optional(&value));
    if if_any_granted.is_none() && if_all_granted.is_none() && if_not_granted.is_none() {
        if_any_granted = Some(DEFAULT_IF_ANY_GRANTED.to_string());
    }

    let gate = AuthorizeGate::from_lists(
        if_any_granted.as_deref(),
        if_all_granted.as_deref(),
        if_not_granted.as_deref(),
    )
    .context("Failed to parse AUTHZ_IF_* gate configuration")?;

    let ledger_authorities = lookup("AUTHZ_LEDGER_AUTHORITIES")
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| DEFAULT_LEDGER_AUTHORITIES.to_string())
        .parse::<RequiredAuthorities>()
        .context("Failed to parse AUTHZ_LEDGER_AUTHORITIES")?;

    Ok(ServiceConfig {
        host,
        port,
        gate,
        ledger_authorities,
    })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
