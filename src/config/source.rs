// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Raw value sources: an environment snapshot and the schema's env file.
//!
//! Env file format, one entry per line:
//!
//! ```text
//! # comment lines and blank lines are skipped
//! CANARY_PUBLIC_DOMAIN=example.com
//! export CANARY_REDIS_HOST = redis.internal
//! CANARY_ALERT_EMAIL_SUBJECT="Canarytokens Alert"
//! ```
//!
//! Lines split at the first `=`. Keys and values are trimmed and one pair of
//! matching surrounding quotes is removed from the value. There is no escape
//! processing, no variable interpolation and no inline comment syntax. A later
//! duplicate key replaces the earlier one.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use super::error::ConfigError;

/// Where a field's raw value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Environment,
    EnvFile,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Environment => write!(f, "environment"),
            Source::EnvFile => write!(f, "env file"),
            Source::Default => write!(f, "default"),
        }
    }
}

/// Snapshot of environment variables.
///
/// Loading works against a snapshot rather than the live process environment
/// so tests can inject any set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: BTreeMap<String, String>,
    // Lossy copies of variables whose name or value is not valid unicode
    undecodable: BTreeMap<String, String>,
}

impl EnvVars {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    /// Build a snapshot from raw OS strings. Entries that are not valid
    /// unicode are kept aside so a load can report them instead of falling
    /// back to the env file or a default.
    pub fn from_os_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut env = Self::default();
        for (key, value) in pairs {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    env.vars.insert(key, value);
                }
                (key, value) => {
                    let key = key.unwrap_or_else(|k| k.to_string_lossy().into_owned());
                    let value = value.unwrap_or_else(|v| v.to_string_lossy().into_owned());
                    debug!("Environment variable {} is not valid unicode", key);
                    env.undecodable.insert(key, value);
                }
            }
        }
        env
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            undecodable: BTreeMap::new(),
        }
    }

    /// Exact-case lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Lookup honoring the schema's case sensitivity.
    pub fn lookup(&self, key: &str, case_sensitive: bool) -> Option<&str> {
        lookup(&self.vars, key, case_sensitive)
    }

    /// Exact-case counterpart of [`EnvVars::lookup_undecodable`].
    pub fn get_undecodable(&self, key: &str) -> Option<&str> {
        self.undecodable.get(key).map(String::as_str)
    }

    /// Lossily decoded value of a variable that is set but not valid unicode.
    pub fn lookup_undecodable(&self, key: &str, case_sensitive: bool) -> Option<&str> {
        lookup(&self.undecodable, key, case_sensitive)
    }

    pub fn len(&self) -> usize {
        self.vars.len() + self.undecodable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty() && self.undecodable.is_empty()
    }
}

/// Text encoding of an env file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    #[default]
    Utf8,
    Latin1,
}

impl FileEncoding {
    pub fn decode(&self, bytes: &[u8]) -> Result<String, String> {
        match self {
            FileEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec()).map_err(|e| format!("not valid UTF-8: {}", e))
            }
            FileEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl FromStr for FileEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(FileEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(FileEncoding::Latin1),
            _ => Err(format!("Unknown encoding: {}", s)),
        }
    }
}

impl fmt::Display for FileEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEncoding::Utf8 => write!(f, "utf-8"),
            FileEncoding::Latin1 => write!(f, "latin-1"),
        }
    }
}

/// Parsed `KEY=VALUE` entries of an env file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl EnvFile {
    /// Read and parse the file at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist. A file that exists but
    /// cannot be read, decoded or parsed is `ConfigFileUnreadable`.
    pub fn read(path: &Path, encoding: FileEncoding) -> Result<Option<Self>, ConfigError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No env file at {}, using environment variables only", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(ConfigError::ConfigFileUnreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let text = encoding
            .decode(&bytes)
            .map_err(|reason| ConfigError::ConfigFileUnreadable {
                path: path.to_path_buf(),
                reason,
            })?;

        let file = Self::parse(path, &text)?;
        debug!("Read {} entries from {}", file.len(), path.display());
        Ok(Some(file))
    }

    pub fn parse(path: impl Into<PathBuf>, text: &str) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut entries = BTreeMap::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::ConfigFileUnreadable {
                    path,
                    reason: format!("line {}: expected KEY=VALUE", index + 1),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::ConfigFileUnreadable {
                    path,
                    reason: format!("line {}: empty key", index + 1),
                });
            }

            entries.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lookup(&self, key: &str, case_sensitive: bool) -> Option<&str> {
        lookup(&self.entries, key, case_sensitive)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

// Exact match wins; otherwise the first case-insensitive match in key order.
fn lookup<'a>(
    vars: &'a BTreeMap<String, String>,
    key: &str,
    case_sensitive: bool,
) -> Option<&'a str> {
    if let Some(value) = vars.get(key) {
        return Some(value);
    }
    if case_sensitive {
        return None;
    }
    vars.iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_lookup_case_handling() {
        let env = EnvVars::from_pairs([("CANARY_REDIS_HOST", "redis"), ("canary_public_ip", "10.0.0.1")]);

        assert_eq!(env.lookup("CANARY_REDIS_HOST", true), Some("redis"));
        assert_eq!(env.lookup("CANARY_PUBLIC_IP", true), None);
        assert_eq!(env.lookup("CANARY_PUBLIC_IP", false), Some("10.0.0.1"));
        assert_eq!(env.get("CANARY_PUBLIC_IP"), None);
    }

    #[test]
    fn test_exact_case_preferred() {
        let env = EnvVars::from_pairs([("CANARY_X", "upper"), ("canary_x", "lower")]);
        assert_eq!(env.lookup("canary_x", false), Some("lower"));
        assert_eq!(env.lookup("CANARY_X", false), Some("upper"));
        assert_eq!(env.lookup("Canary_X", false), Some("upper"));
    }

    #[cfg(unix)]
    #[test]
    fn test_undecodable_variables_kept_aside() {
        use std::os::unix::ffi::OsStringExt;

        let env = EnvVars::from_os_pairs([
            (OsString::from("CANARY_REDIS_HOST"), OsString::from("redis")),
            (OsString::from("CANARY_REDIS_PORT"), OsString::from_vec(b"80\xff".to_vec())),
            (OsString::from_vec(b"CANARY_\xffX".to_vec()), OsString::from("1")),
        ]);

        assert_eq!(env.get("CANARY_REDIS_HOST"), Some("redis"));
        assert_eq!(env.get("CANARY_REDIS_PORT"), None);
        assert_eq!(env.lookup_undecodable("CANARY_REDIS_PORT", true), Some("80\u{FFFD}"));
        assert_eq!(env.lookup_undecodable("canary_redis_port", false), Some("80\u{FFFD}"));
        assert_eq!(env.lookup_undecodable("CANARY_\u{FFFD}X", true), Some("1"));
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn test_parse_env_file() {
        let text = "\
# switchboard settings

CANARY_PUBLIC_DOMAIN=example.com
export CANARY_REDIS_HOST = redis.internal
CANARY_ALERT_EMAIL_SUBJECT=\"Canarytokens Alert\"
CANARY_REAL_IP_HEADER='x-forwarded-for'
CANARY_TEMPLATES_PATH=/srv/templates#not-a-comment
CANARY_EMPTY=
CANARY_EQUALS=a=b
CANARY_INTERP=$HOME
CANARY_PUBLIC_DOMAIN=example.org
";
        let file = EnvFile::parse("switchboard.env", text).unwrap();

        assert_eq!(file.lookup("CANARY_PUBLIC_DOMAIN", true), Some("example.org"));
        assert_eq!(file.lookup("CANARY_REDIS_HOST", true), Some("redis.internal"));
        assert_eq!(file.lookup("CANARY_ALERT_EMAIL_SUBJECT", true), Some("Canarytokens Alert"));
        assert_eq!(file.lookup("CANARY_REAL_IP_HEADER", true), Some("x-forwarded-for"));
        assert_eq!(file.lookup("CANARY_TEMPLATES_PATH", true), Some("/srv/templates#not-a-comment"));
        assert_eq!(file.lookup("CANARY_EMPTY", true), Some(""));
        assert_eq!(file.lookup("CANARY_EQUALS", true), Some("a=b"));
        assert_eq!(file.lookup("CANARY_INTERP", true), Some("$HOME"));
        assert_eq!(file.len(), 8);
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        let err = EnvFile::parse("bad.env", "CANARY_OK=1\nNOT A PAIR\n").unwrap_err();
        match err {
            ConfigError::ConfigFileUnreadable { reason, .. } => assert!(reason.contains("line 2")),
            other => panic!("Expected ConfigFileUnreadable, got {:?}", other),
        }

        assert!(EnvFile::parse("bad.env", "=value").is_err());
    }

    #[test]
    fn test_unquote_only_matching_pairs() {
        assert_eq!(unquote("\"quoted\""), "quoted");
        assert_eq!(unquote("'single'"), "single");
        assert_eq!(unquote("\"mismatched'"), "\"mismatched'");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("frontend.env");
        assert!(EnvFile::read(&missing, FileEncoding::Utf8).unwrap().is_none());
    }

    #[test]
    fn test_read_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFCANARY_PUBLIC_IP=10.1.1.1\r\nCANARY_DOMAINS=a.com,b.com\r\n")
            .unwrap();

        let parsed = EnvFile::read(file.path(), FileEncoding::Utf8).unwrap().unwrap();
        assert_eq!(parsed.lookup("CANARY_PUBLIC_IP", true), Some("10.1.1.1"));
        assert_eq!(parsed.lookup("CANARY_DOMAINS", true), Some("a.com,b.com"));
        assert_eq!(parsed.path(), file.path());
    }

    #[test]
    fn test_undecodable_file_is_unreadable() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"CANARY_ALERT_EMAIL_FROM_DISPLAY=Caf\xE9\n").unwrap();

        let err = EnvFile::read(file.path(), FileEncoding::Utf8).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileUnreadable { .. }));

        let latin = EnvFile::read(file.path(), FileEncoding::Latin1).unwrap().unwrap();
        assert_eq!(latin.lookup("CANARY_ALERT_EMAIL_FROM_DISPLAY", true), Some("Café"));
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = EnvFile::read(dir.path(), FileEncoding::Utf8).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileUnreadable { .. }));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<FileEncoding>().unwrap(), FileEncoding::Utf8);
        assert_eq!("latin-1".parse::<FileEncoding>().unwrap(), FileEncoding::Latin1);
        assert!("utf-16".parse::<FileEncoding>().is_err());
        assert_eq!(FileEncoding::default().to_string(), "utf-8");
    }
}
