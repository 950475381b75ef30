// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Scalar coercion: raw environment strings into typed setting values.
//!
//! Each [`FieldKind`] has one conversion rule. Conversions return the
//! human-readable expectation on failure; the loader attaches the field,
//! key and (redacted) raw value to build the final error.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use url::Url;

use super::secret::SecretString;

/// Longest URL accepted for `Url` fields.
pub const MAX_URL_LENGTH: usize = 2083;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap()
});

/// Declared semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Bool,
    Int,
    Port,
    Secret,
    Url,
    Email,
    /// One of a closed, case-sensitive set of strings.
    Literal(&'static [&'static str]),
    List,
}

impl FieldKind {
    /// Description of what a valid raw value looks like.
    pub fn expected(&self) -> String {
        match self {
            FieldKind::Str => "a string".to_string(),
            FieldKind::Bool => "a boolean (true/false/yes/no/1/0/on/off)".to_string(),
            FieldKind::Int => "a base-10 integer".to_string(),
            FieldKind::Port => "a port number (0-65535)".to_string(),
            FieldKind::Secret => "a secret string".to_string(),
            FieldKind::Url => format!(
                "an absolute http or https URL of at most {} characters",
                MAX_URL_LENGTH
            ),
            FieldKind::Email => "a valid email address".to_string(),
            FieldKind::Literal(allowed) => format!("one of: {}", allowed.join(", ")),
            FieldKind::List => "a JSON array of strings".to_string(),
        }
    }

    /// Textual kinds keep empty strings; every other kind treats an empty
    /// optional value as absent.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Str | FieldKind::Secret)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Str => "str",
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Port => "port",
            FieldKind::Secret => "secret",
            FieldKind::Url => "url",
            FieldKind::Email => "email",
            FieldKind::Literal(_) => "literal",
            FieldKind::List => "list",
        };
        f.write_str(name)
    }
}

/// A validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, domain)| domain).unwrap_or_default()
    }
}

impl FromStr for EmailAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FieldKind::Email.expected();
        if s.len() > MAX_EMAIL_LENGTH || !EMAIL_PATTERN.is_match(s) {
            return Err(invalid());
        }
        let (local, _) = s.rsplit_once('@').ok_or_else(invalid)?;
        if local.len() > MAX_EMAIL_LOCAL_LENGTH
            || local.starts_with('.')
            || local.ends_with('.')
            || local.contains("..")
        {
            return Err(invalid());
        }
        Ok(EmailAddress(s.to_string()))
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved, typed setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Optional field with no value from any source.
    Absent,
    Str(String),
    Bool(bool),
    Int(i64),
    Port(u16),
    Secret(SecretString),
    Url(Url),
    Email(EmailAddress),
    Literal(String),
    List(Vec<String>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Port(_) => "port",
            Value::Secret(_) => "secret",
            Value::Url(_) => "url",
            Value::Email(_) => "email",
            Value::Literal(_) => "literal",
            Value::List(_) => "list",
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_none(),
            Value::Str(s) | Value::Literal(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Port(p) => serializer.serialize_u16(*p),
            Value::Secret(secret) => secret.serialize(serializer),
            Value::Url(url) => serializer.serialize_str(url.as_str()),
            Value::Email(email) => email.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
        }
    }
}

/// Convert a raw string into a value of the given kind.
pub fn coerce(raw: &str, kind: FieldKind) -> Result<Value, String> {
    match kind {
        FieldKind::Str => Ok(Value::Str(raw.to_string())),
        FieldKind::Secret => Ok(Value::Secret(SecretString::from(raw))),
        FieldKind::Bool => parse_bool(raw).map(Value::Bool),
        FieldKind::Int => parse_int(raw).map(Value::Int),
        FieldKind::Port => parse_port(raw).map(Value::Port),
        FieldKind::Url => parse_http_url(raw).map(Value::Url),
        FieldKind::Email => raw.parse::<EmailAddress>().map(Value::Email),
        FieldKind::Literal(allowed) => parse_literal(raw, allowed).map(Value::Literal),
        FieldKind::List => parse_json_list(raw).map(Value::List),
    }
}

pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(FieldKind::Bool.expected()),
    }
}

pub fn parse_int(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FieldKind::Int.expected())
}

pub fn parse_port(raw: &str) -> Result<u16, String> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| FieldKind::Port.expected())?;
    u16::try_from(value).map_err(|_| FieldKind::Port.expected())
}

pub fn parse_http_url(raw: &str) -> Result<Url, String> {
    if raw.len() > MAX_URL_LENGTH {
        return Err(FieldKind::Url.expected());
    }
    let url = Url::parse(raw).map_err(|e| format!("{} ({})", FieldKind::Url.expected(), e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FieldKind::Url.expected());
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(FieldKind::Url.expected());
    }
    Ok(url)
}

pub fn parse_literal(raw: &str, allowed: &[&str]) -> Result<String, String> {
    if allowed.contains(&raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("one of: {}", allowed.join(", ")))
    }
}

fn parse_json_list(raw: &str) -> Result<Vec<String>, String> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|_| FieldKind::List.expected())
}

/// Extraction of a concrete Rust type from a resolved [`Value`].
///
/// Returns `None` when the value holds a different kind.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) | Value::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }
}

impl FromValue for u16 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Port(p) => Some(p),
            _ => None,
        }
    }
}

impl FromValue for SecretString {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Secret(secret) => Some(secret),
            _ => None,
        }
    }
}

impl FromValue for Url {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Url(url) => Some(url),
            _ => None,
        }
    }
}

impl FromValue for EmailAddress {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Email(email) => Some(email),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Absent => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
