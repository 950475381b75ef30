// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Cross-field checks registered on the switchboard and frontend schemas.
//!
//! Checks run over whatever fields resolved, so a check skips quietly when a
//! field it reads already failed on its own.

use tracing::warn;

use super::coerce::{EmailAddress, Value};
use super::error::ConfigError;
use super::secret::SecretString;
use super::settings::Settings;
use super::types::{SentryEnvironment, ENV_PREFIX};

const PLACEHOLDER_SENDER: &str = "illegal@email.com";
const REDIS_AUTH_DISABLED: &str = "auth_disabled";

fn invalid(field: &str, value: impl ToString, expected: &str) -> ConfigError {
    ConfigError::InvalidFieldValue {
        field: field.to_string(),
        key: format!("{}{}", ENV_PREFIX, field),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn is_set(settings: &Settings, field: &str) -> bool {
    settings.get(field).is_some_and(|value| *value != Value::Absent)
}

fn sentry_without_dsn(settings: &Settings) -> bool {
    settings.get_as::<bool>("SENTRY_ENABLE").unwrap_or(false) && !is_set(settings, "SENTRY_DSN")
}

pub(super) fn switchboard(settings: &Settings) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if let Ok(scheme) = settings.get_as::<String>("SWITCHBOARD_SCHEME") {
        if !matches!(scheme.as_str(), "http" | "https") {
            errors.push(invalid("SWITCHBOARD_SCHEME", scheme, "http or https"));
        }
    }

    if sentry_without_dsn(settings) {
        warn!("Sentry is enabled for the switchboard but no SENTRY_DSN is set");
    }
    if is_set(settings, "MAILGUN_API_KEY") && !is_set(settings, "MAILGUN_DOMAIN_NAME") {
        warn!("MAILGUN_API_KEY is set without MAILGUN_DOMAIN_NAME, Mailgun stays disabled");
    }
    if is_set(settings, "SMTP_SERVER")
        && !(is_set(settings, "SMTP_USERNAME") && is_set(settings, "SMTP_PASSWORD"))
    {
        warn!("SMTP_SERVER is set without SMTP credentials");
    }

    let production = settings
        .get_as::<SentryEnvironment>("SENTRY_ENVIRONMENT")
        .is_ok_and(|env| env.is_production());
    if production {
        if let Ok(sender) = settings.get_as::<EmailAddress>("ALERT_EMAIL_FROM_ADDRESS") {
            if sender.as_str() == PLACEHOLDER_SENDER {
                warn!("Alert emails use the placeholder sender address in production");
            }
        }
        if let Ok(password) = settings.get_as::<SecretString>("REDIS_PASSWORD") {
            if password.expose() == REDIS_AUTH_DISABLED {
                warn!("Redis authentication is disabled in production");
            }
        }
        if matches!(settings.get_as::<bool>("FORCE_HTTPS"), Ok(false)) {
            warn!("FORCE_HTTPS is disabled in production");
        }
    }

    errors
}

pub(super) fn frontend(settings: &Settings) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    for field in ["API_REDOC_URL", "STATIC_FILES_APPLICATION_SUB_PATH"] {
        if let Ok(Some(path)) = settings.get_as::<Option<String>>(field) {
            if !path.starts_with('/') {
                errors.push(invalid(field, path, "a path starting with /"));
            }
        }
    }
    if let Ok(size) = settings.get_as::<i64>("MAX_UPLOAD_SIZE") {
        if size <= 0 {
            errors.push(invalid("MAX_UPLOAD_SIZE", size, "a positive number of bytes"));
        }
    }

    if sentry_without_dsn(settings) {
        warn!("Sentry is enabled for the frontend but no SENTRY_DSN is set");
    }

    errors
}
