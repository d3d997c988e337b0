use common_authority::{
    is_all_granted, is_any_granted, is_none_granted, ConfigError, RequiredAuthorities,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::SecurityContext;
use crate::error::SecurityError;

/// Outcome of a gate: render the guarded content or skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Render,
    Skip,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Render => "render",
            Decision::Skip => "skip",
        }
    }
}

/// Authority requirements guarding a piece of content.
///
/// At least one requirement is always present. All configured requirements
/// must pass for the content to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeGate {
    if_any_granted: Option<RequiredAuthorities>,
    if_all_granted: Option<RequiredAuthorities>,
    if_not_granted: Option<RequiredAuthorities>,
}

impl AuthorizeGate {
    pub fn builder() -> AuthorizeGateBuilder {
        AuthorizeGateBuilder::default()
    }

    /// Shorthand for a gate with only an `if_any_granted` requirement.
    pub fn any_of(csv: &str) -> Result<Self, ConfigError> {
        Self::builder().if_any_granted(csv)?.build()
    }

    /// Build from optional comma separated lists as they appear in config.
    pub fn from_lists(
        if_any_granted: Option<&str>,
        if_all_granted: Option<&str>,
        if_not_granted: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if let Some(csv) = if_any_granted {
            builder = builder.if_any_granted(csv)?;
        }
        if let Some(csv) = if_all_granted {
            builder = builder.if_all_granted(csv)?;
        }
        if let Some(csv) = if_not_granted {
            builder = builder.if_not_granted(csv)?;
        }
        builder.build()
    }

    pub fn if_any_granted(&self) -> Option<&RequiredAuthorities> {
        self.if_any_granted.as_ref()
    }

    pub fn if_all_granted(&self) -> Option<&RequiredAuthorities> {
        self.if_all_granted.as_ref()
    }

    pub fn if_not_granted(&self) -> Option<&RequiredAuthorities> {
        self.if_not_granted.as_ref()
    }

    /// Names a caller could acquire to pass this gate, for error reporting.
    pub fn required_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .if_all_granted
            .iter()
            .chain(self.if_any_granted.iter())
            .flat_map(|required| required.iter().map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn evaluate(&self, ctx: &SecurityContext) -> Result<Decision, SecurityError> {
        let decision = self.decide(ctx).map_err(|err| {
            warn!(
                principal = ctx.principal().unwrap_or("anonymous"),
                trace_id = ?ctx.trace_id,
                error = %err,
                "authority_check_invalid"
            );
            SecurityError::from(err)
        })?;

        debug!(
            principal = ctx.principal().unwrap_or("anonymous"),
            trace_id = ?ctx.trace_id,
            decision = decision.as_str(),
            "authority_check"
        );
        Ok(decision)
    }

    fn decide(&self, ctx: &SecurityContext) -> Result<Decision, common_authority::AuthorityError> {
        let held = ctx.granted_authorities();

        if let Some(required) = &self.if_not_granted {
            if !is_none_granted(required, held)? {
                return Ok(Decision::Skip);
            }
        }
        if let Some(required) = &self.if_all_granted {
            if !is_all_granted(required, held)? {
                return Ok(Decision::Skip);
            }
        }
        if let Some(required) = &self.if_any_granted {
            if !is_any_granted(required, held)? {
                return Ok(Decision::Skip);
            }
        }
        Ok(Decision::Render)
    }
}

#[derive(Debug, Default)]
pub struct AuthorizeGateBuilder {
    if_any_granted: Option<RequiredAuthorities>,
    if_all_granted: Option<RequiredAuthorities>,
    if_not_granted: Option<RequiredAuthorities>,
}

impl AuthorizeGateBuilder {
    pub fn if_any_granted(mut self, csv: &str) -> Result<Self, ConfigError> {
        self.if_any_granted = Some(RequiredAuthorities::parse(csv)?);
        Ok(self)
    }

    pub fn if_all_granted(mut self, csv: &str) -> Result<Self, ConfigError> {
        self.if_all_granted = Some(RequiredAuthorities::parse(csv)?);
        Ok(self)
    }

    pub fn if_not_granted(mut self, csv: &str) -> Result<Self, ConfigError> {
        self.if_not_granted = Some(RequiredAuthorities::parse(csv)?);
        Ok(self)
    }

    pub fn build(self) -> Result<AuthorizeGate, ConfigError> {
        if self.if_any_granted.is_none()
            && self.if_all_granted.is_none()
            && self.if_not_granted.is_none()
        {
            return Err(ConfigError::NoRequirements);
        }
        Ok(AuthorizeGate {
            if_any_granted: self.if_any_granted,
            if_all_granted: self.if_all_granted,
            if_not_granted: self.if_not_granted,
        })
    }
}
