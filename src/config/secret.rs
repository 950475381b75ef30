// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Secret values that redact themselves in logs, errors and serialized output.

use std::fmt;

use serde::{Serialize, Serializer};

/// Placeholder rendered in place of any secret.
pub const REDACTED: &str = "[REDACTED]";

/// A string that must never be displayed or serialized in plaintext.
///
/// `Display`, `Debug` and `Serialize` all emit [`REDACTED`]. The underlying
/// value is reachable only through [`SecretString::expose`] or
/// [`SecretString::into_inner`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretString(Box<str>);

impl SecretString {
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the underlying secret.
    pub fn into_inner(self) -> String {
        self.0.into_string()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_round_trip() {
        let secret = SecretString::from("hunter2");
        assert_eq!(secret.expose(), "hunter2");
        assert_eq!(secret.clone().into_inner(), "hunter2");
    }

    #[test]
    fn test_secret_never_rendered() {
        let secret = SecretString::from("hunter2");
        assert_eq!(secret.to_string(), REDACTED);
        assert_eq!(format!("{:?}", secret), REDACTED);
        assert!(!format!("{:?}", Some(secret.clone())).contains("hunter2"));

        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"[REDACTED]\"");
    }

    #[test]
    fn test_secret_equality_is_on_value() {
        assert_eq!(SecretString::from("a"), SecretString::new("a"));
        assert_ne!(SecretString::from("a"), SecretString::from("b"));
    }
}
