// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//! Settings loading: resolve, coerce and freeze every field of a schema.
//!
//! A load either produces a complete [`Settings`] or fails; it never returns
//! a partially resolved instance. Every field is attempted so that all
//! configuration problems are reported together.

use tracing::{debug, info, warn};

use super::coerce::{coerce, FieldKind, Value};
use super::error::ConfigError;
use super::schema::{DefaultValue, FieldDescriptor, Schema};
use super::secret::REDACTED;
use super::settings::Settings;
use super::source::{EnvFile, EnvVars, Source};

/// Load a schema from `env` and the schema's bound env file.
pub fn load(schema: &Schema, env: &EnvVars) -> Result<Settings, ConfigError> {
    let file = match schema.env_file() {
        Some(path) => EnvFile::read(path, schema.encoding())?,
        None => None,
    };
    load_with_file(schema, env, file.as_ref())
}

/// Load a schema from an explicit environment snapshot and optional env file.
///
/// Performs no I/O.
pub fn load_with_file(
    schema: &Schema,
    env: &EnvVars,
    file: Option<&EnvFile>,
) -> Result<Settings, ConfigError> {
    schema.check()?;
    debug!(
        "Resolving {} settings ({} fields)",
        schema.name(),
        schema.fields().len()
    );

    let mut values = Vec::with_capacity(schema.fields().len());
    let mut errors = Vec::new();

    for field in schema.fields() {
        match resolve_field(schema, field, env, file) {
            Ok(value) => values.push((field.name(), value)),
            Err(e) => errors.push(e),
        }
    }

    // Cross-field checks see every field that resolved, so their errors are
    // reported alongside any field errors.
    let settings = Settings::freeze(schema.name(), values);
    for check in schema.validators() {
        errors.extend(check(&settings));
    }

    if let Some(err) = ConfigError::from_errors(errors) {
        warn!("Failed to load {} settings: {}", schema.name(), err);
        return Err(err);
    }

    info!("Loaded {} settings", schema.name());
    Ok(settings)
}

fn resolve_field(
    schema: &Schema,
    field: &FieldDescriptor,
    env: &EnvVars,
    file: Option<&EnvFile>,
) -> Result<Value, ConfigError> {
    let key = schema.key_for(field);
    let Some((raw, source)) = resolve_raw(schema, field, &key, env, file)? else {
        debug!("{} not set, leaving it empty", key);
        return Ok(Value::Absent);
    };
    debug!("{} resolved from {}", key, source);

    if let Some(parser) = schema.override_for(field.name()) {
        return parser(&raw).map_err(|reason| ConfigError::ParseOverrideFailure {
            field: field.name().to_string(),
            key,
            value: shown_value(field.kind(), &raw),
            reason,
        });
    }

    if raw.is_empty() && field.is_optional() && !field.kind().is_textual() {
        return Ok(Value::Absent);
    }

    coerce(&raw, field.kind()).map_err(|expected| ConfigError::InvalidFieldValue {
        field: field.name().to_string(),
        key,
        value: shown_value(field.kind(), &raw),
        expected,
    })
}

// Environment, then env file, then the declared default. First hit wins.
fn resolve_raw(
    schema: &Schema,
    field: &FieldDescriptor,
    key: &str,
    env: &EnvVars,
    file: Option<&EnvFile>,
) -> Result<Option<(String, Source)>, ConfigError> {
    let case_sensitive = schema.is_case_sensitive();

    if let Some(lossy) = env.lookup_undecodable(key, case_sensitive) {
        return Err(undecodable(field, key, lossy));
    }
    if let Some(value) = env.lookup(key, case_sensitive) {
        return Ok(Some((value.to_string(), Source::Environment)));
    }
    if let Some(value) = file.and_then(|f| f.lookup(key, case_sensitive)) {
        return Ok(Some((value.to_string(), Source::EnvFile)));
    }

    let (default, fallback_key) = match field.default_value() {
        DefaultValue::Absent => return Ok(None),
        DefaultValue::Raw(raw) => (Some(raw), None),
        DefaultValue::FromEnv { key: env_key, fallback } => {
            if let Some(lossy) = env.get_undecodable(env_key) {
                return Err(undecodable(field, env_key, lossy));
            }
            (env.get(env_key).or(fallback), Some(env_key))
        }
        DefaultValue::Required => (None, None),
    };

    match default {
        Some(raw) => Ok(Some((raw.to_string(), Source::Default))),
        None => Err(ConfigError::MissingRequiredField {
            field: field.name().to_string(),
            key: key.to_string(),
            fallback: fallback_key.map(str::to_string),
        }),
    }
}

fn undecodable(field: &FieldDescriptor, key: &str, lossy: &str) -> ConfigError {
    ConfigError::InvalidFieldValue {
        field: field.name().to_string(),
        key: key.to_string(),
        value: shown_value(field.kind(), lossy),
        expected: "valid unicode".to_string(),
    }
}

fn shown_value(kind: FieldKind, raw: &str) -> String {
    if kind == FieldKind::Secret {
        REDACTED.to_string()
    } else {
        raw.to_string()
    }
}
