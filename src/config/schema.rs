// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Schema definitions: field descriptors, defaults and parse overrides.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::coerce::{FieldKind, Value};
use super::error::ConfigError;
use super::settings::Settings;
use super::source::FileEncoding;

/// Custom parser for a single field, bypassing default coercion.
///
/// Plain function pointers keep overrides free of captured state. They must
/// accept any input and report bad input through `Err`.
pub type ParseFn = fn(&str) -> Result<Value, String>;

/// Cross-field check run after every field has been attempted.
///
/// Sees only the fields that resolved, and returns the errors it finds so
/// they are reported together with any field errors.
pub type ValidateFn = fn(&Settings) -> Vec<ConfigError>;

/// What a field resolves to when neither the environment nor the env file
/// provides a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Required,
    /// Optional field, resolves to [`Value::Absent`].
    Absent,
    /// Static raw string, coerced like any other raw value.
    Raw(&'static str),
    /// Read an unprefixed variable from the injected environment at load
    /// time, then `fallback`. Required when both are missing.
    FromEnv {
        key: &'static str,
        fallback: Option<&'static str>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    default: DefaultValue,
}

impl FieldDescriptor {
    /// A required field of the given kind.
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            default: DefaultValue::Required,
        }
    }

    pub fn with_default(mut self, raw: &'static str) -> Self {
        self.default = DefaultValue::Raw(raw);
        self
    }

    pub fn optional(mut self) -> Self {
        self.default = DefaultValue::Absent;
        self
    }

    pub fn default_from_env(mut self, key: &'static str, fallback: Option<&'static str>) -> Self {
        self.default = DefaultValue::FromEnv { key, fallback };
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn default_value(&self) -> DefaultValue {
        self.default
    }

    pub fn is_optional(&self) -> bool {
        self.default == DefaultValue::Absent
    }
}

/// An ordered set of field descriptors bound to an env prefix and env file.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    prefix: String,
    env_file: Option<PathBuf>,
    encoding: FileEncoding,
    case_sensitive: bool,
    fields: Vec<FieldDescriptor>,
    overrides: BTreeMap<&'static str, ParseFn>,
    validators: Vec<ValidateFn>,
}

impl Schema {
    pub fn new(name: &'static str, prefix: impl Into<String>) -> Self {
        Self {
            name,
            prefix: prefix.into(),
            env_file: None,
            encoding: FileEncoding::default(),
            case_sensitive: false,
            fields: Vec::new(),
            overrides: BTreeMap::new(),
            validators: Vec::new(),
        }
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self
    }

    pub fn with_encoding(mut self, encoding: FileEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Register a custom parser for `field`, replacing any earlier one.
    pub fn parse_override(mut self, field: &'static str, parser: ParseFn) -> Self {
        self.overrides.insert(field, parser);
        self
    }

    pub fn validate_with(mut self, check: ValidateFn) -> Self {
        self.validators.push(check);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    pub fn encoding(&self) -> FileEncoding {
        self.encoding
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn override_for(&self, field: &str) -> Option<ParseFn> {
        self.overrides.get(field).copied()
    }

    pub fn validators(&self) -> &[ValidateFn] {
        &self.validators
    }

    /// Environment variable name for a field: `<PREFIX><NAME>`.
    pub fn key_for(&self, field: &FieldDescriptor) -> String {
        format!("{}{}", self.prefix, field.name)
    }

    /// Reject duplicate field names and overrides for undefined fields.
    pub fn check(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name) {
                return Err(self.invalid(format!("field {} is defined twice", field.name)));
            }
        }

        if let Some(name) = self.overrides.keys().find(|name| !seen.contains(*name)) {
            return Err(self.invalid(format!("parse override registered for unknown field {}", name)));
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> ConfigError {
        ConfigError::InvalidSchema {
            schema: self.name.to_string(),
            reason,
        }
    }
}

/// Parse override for comma-separated list fields.
///
/// Tokens are kept verbatim, including surrounding whitespace and empty
/// segments. Empty input is rejected since consumers expect at least one entry.
pub fn comma_separated(raw: &str) -> Result<Value, String> {
    if raw.is_empty() {
        return Err("expected at least one comma-separated entry".to_string());
    }
    Ok(Value::List(raw.split(',').map(str::to_string).collect()))
}
