// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Shared setting types used by both the switchboard and frontend schemas.

use std::str::FromStr;

use serde::Serialize;

use super::coerce::{FromValue, Value};

/// Prefix shared by every setting in this deployment.
pub const ENV_PREFIX: &str = "CANARY_";

/// Allowed values for `SENTRY_ENVIRONMENT`.
pub const SENTRY_ENVIRONMENTS: &[&str] = &["prod", "staging", "dev", "ci", "local"];

/// Allowed values for `TOKEN_RETURN`.
pub const TOKEN_RETURNS: &[&str] = &["gif", "fortune"];

/// Deployment environment reported to Sentry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentryEnvironment {
    Prod,
    Staging,
    Dev,
    Ci,
    Local,
}

impl SentryEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentryEnvironment::Prod => "prod",
            SentryEnvironment::Staging => "staging",
            SentryEnvironment::Dev => "dev",
            SentryEnvironment::Ci => "ci",
            SentryEnvironment::Local => "local",
        }
    }

    pub fn is_production(&self) -> bool {
        *self == SentryEnvironment::Prod
    }
}

impl FromStr for SentryEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prod" => Ok(SentryEnvironment::Prod),
            "staging" => Ok(SentryEnvironment::Staging),
            "dev" => Ok(SentryEnvironment::Dev),
            "ci" => Ok(SentryEnvironment::Ci),
            "local" => Ok(SentryEnvironment::Local),
            _ => Err(format!(
                "Unknown Sentry environment: {}. Valid values are: {}",
                s,
                SENTRY_ENVIRONMENTS.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for SentryEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromValue for SentryEnvironment {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Literal(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Response body the switchboard serves when a web bug token fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenReturn {
    Gif,
    Fortune,
}

impl TokenReturn {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenReturn::Gif => "gif",
            TokenReturn::Fortune => "fortune",
        }
    }
}

impl FromStr for TokenReturn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gif" => Ok(TokenReturn::Gif),
            "fortune" => Ok(TokenReturn::Fortune),
            _ => Err(format!(
                "Unknown token return: {}. Valid values are: {}",
                s,
                TOKEN_RETURNS.join(", ")
            )),
        }
    }
}

impl std::fmt::Display for TokenReturn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromValue for TokenReturn {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Literal(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Read-only accessors for typed settings structs.
///
/// `copy` fields are returned by value, `borrow` fields by reference.
macro_rules! accessors {
    (impl $ty:ty {
        copy { $($copy:ident: $copy_ty:ty),* $(,)? }
        borrow { $($borrow:ident: $borrow_ty:ty),* $(,)? }
    }) => {
        impl $ty {
            $(
                pub fn $copy(&self) -> $copy_ty {
                    self.$copy
                }
            )*
            $(
                pub fn $borrow(&self) -> &$borrow_ty {
                    &self.$borrow
                }
            )*
        }
    };
}

pub(crate) use accessors;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentry_environment_parsing() {
        for name in SENTRY_ENVIRONMENTS {
            let env: SentryEnvironment = name.parse().unwrap();
            assert_eq!(env.as_str(), *name);
        }
        assert!("foo".parse::<SentryEnvironment>().is_err());
        assert!("Prod".parse::<SentryEnvironment>().is_err());
        assert!(SentryEnvironment::Prod.is_production());
        assert!(!SentryEnvironment::Local.is_production());
    }

    #[test]
    fn test_token_return_parsing() {
        assert_eq!("gif".parse::<TokenReturn>().unwrap(), TokenReturn::Gif);
        assert_eq!("fortune".parse::<TokenReturn>().unwrap(), TokenReturn::Fortune);
        assert!("png".parse::<TokenReturn>().is_err());
        assert_eq!(TokenReturn::Fortune.to_string(), "fortune");
    }

    #[test]
    fn test_literal_from_value() {
        assert_eq!(
            SentryEnvironment::from_value(Value::Literal("ci".to_string())),
            Some(SentryEnvironment::Ci)
        );
        assert_eq!(TokenReturn::from_value(Value::Str("gif".to_string())), None);
    }

    #[test]
    fn test_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&SentryEnvironment::Staging).unwrap(), "\"staging\"");
        assert_eq!(serde_json::to_string(&TokenReturn::Gif).unwrap(), "\"gif\"");
    }
}
