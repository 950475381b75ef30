// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//! Configuration error types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Missing required setting {field}: set {key}{} in the environment or the env file",
        or_fallback(.fallback)
    )]
    MissingRequiredField {
        field: String,
        key: String,
        /// Unprefixed variable also accepted for this field
        fallback: Option<String>,
    },

    #[error("Invalid value for {key}: '{value}' - expected {expected}")]
    InvalidFieldValue {
        field: String,
        key: String,
        value: String,
        expected: String,
    },

    #[error("Parse error for {key}: '{value}' - {reason}")]
    ParseOverrideFailure {
        field: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Env file {} is unreadable: {reason}", .path.display())]
    ConfigFileUnreadable { path: PathBuf, reason: String },

    #[error("Settings are frozen, cannot assign {field}")]
    FrozenInstance { field: String },

    #[error("Invalid {schema} schema: {reason}")]
    InvalidSchema { schema: String, reason: String },

    #[error("{} configuration errors: {}", .0.len(), join(.0))]
    Multiple(Vec<ConfigError>),
}

impl ConfigError {
    /// Collapse a list of field errors: none is success, one is returned as is.
    pub fn from_errors(mut errors: Vec<ConfigError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ConfigError::Multiple(errors)),
        }
    }

    /// Iterate the individual errors, flattening `Multiple`.
    pub fn errors(&self) -> std::slice::Iter<'_, ConfigError> {
        match self {
            ConfigError::Multiple(errors) => errors.iter(),
            other => std::slice::from_ref(other).iter(),
        }
    }

    /// Field name the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingRequiredField { field, .. }
            | ConfigError::InvalidFieldValue { field, .. }
            | ConfigError::ParseOverrideFailure { field, .. }
            | ConfigError::FrozenInstance { field } => Some(field.as_str()),
            _ => None,
        }
    }
}

fn or_fallback(fallback: &Option<String>) -> String {
    fallback
        .as_ref()
        .map(|key| format!(" (or {})", key))
        .unwrap_or_default()
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
