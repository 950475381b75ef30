// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Canarytokens settings
//! Values come from CANARY_* environment variables, then the service's env
//! file, then the declared default. Loaded settings are immutable.

mod coerce;
mod error;
pub mod frontend;
mod loader;
mod schema;
mod secret;
mod settings;
mod source;
pub mod switchboard;
mod types;
mod validation;

pub use coerce::{
    coerce, parse_bool, parse_http_url, parse_int, parse_literal, parse_port, EmailAddress,
    FieldKind, FromValue, Value, MAX_URL_LENGTH,
};
pub use error::ConfigError;
pub use frontend::{FrontendSettings, FRONTEND_ENV_FILE};
pub use loader::{load, load_with_file};
pub use schema::{comma_separated, DefaultValue, FieldDescriptor, ParseFn, Schema, ValidateFn};
pub use secret::{SecretString, REDACTED};
pub use settings::{Frozen, Settings};
pub use source::{EnvFile, EnvVars, FileEncoding, Source};
pub use switchboard::{SwitchboardSettings, SWITCHBOARD_ENV_FILE};
pub use types::{SentryEnvironment, TokenReturn, ENV_PREFIX, SENTRY_ENVIRONMENTS, TOKEN_RETURNS};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn switchboard_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CANARY_PUBLIC_DOMAIN", "canarytokens.example"),
            ("CANARY_WG_PRIVATE_KEY_SEED", "vk/GD+frlhve/hDTTSUvqpQ/WsQtioKAri0Rt5mg7dw="),
        ]
    }

    #[test]
    fn test_switchboard_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchboard.env");
        fs::write(
            &path,
            "# switchboard\nCANARY_REDIS_PORT=6380\nCANARY_TOKEN_RETURN=fortune\nCANARY_CHANNEL_DNS_PORT=5353\n",
        )
        .unwrap();

        let schema = switchboard::schema().with_env_file(&path);
        let env = EnvVars::from_pairs(
            switchboard_env().into_iter().chain([("CANARY_CHANNEL_DNS_PORT", "53")]),
        );
        let settings = SwitchboardSettings::load_with(&schema, &env).unwrap();

        assert_eq!(settings.redis_port(), 6380);
        assert_eq!(settings.token_return(), TokenReturn::Fortune);
        assert_eq!(settings.channel_dns_port(), 53);
        assert_eq!(settings.redis_address(), "localhost:6380");
    }

    #[test]
    fn test_switchboard_missing_public_domain() {
        let schema = switchboard::schema().without_env_file();
        let env = EnvVars::from_pairs([("CANARY_WG_PRIVATE_KEY_SEED", "seed")]);

        match SwitchboardSettings::load_with(&schema, &env).unwrap_err() {
            ConfigError::MissingRequiredField { field, key, .. } => {
                assert_eq!(field, "PUBLIC_DOMAIN");
                assert_eq!(key, "CANARY_PUBLIC_DOMAIN");
            }
            other => panic!("Expected MissingRequiredField, got {:?}", other),
        }
    }

    #[test]
    fn test_frontend_from_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontend.env");
        let mut contents = b"CANARY_PUBLIC_IP=10.1.1.1\nCANARY_DOMAINS=a,b,c\nCANARY_NXDOMAINS=nx\nCANARY_API_APP_TITLE=Caf".to_vec();
        contents.extend([0xe9, b'\n']);
        fs::write(&path, contents).unwrap();

        let schema = frontend::schema()
            .with_env_file(&path)
            .with_encoding(FileEncoding::Latin1);
        let env = EnvVars::from_pairs([("ST_OAUTH_TOKEN", "token")]);
        let settings = FrontendSettings::load_with(&schema, &env).unwrap();

        assert_eq!(settings.domains(), ["a", "b", "c"]);
        assert_eq!(settings.api_app_title(), "Café");
        assert_eq!(settings.public_ip(), "10.1.1.1");
    }

    #[test]
    fn test_generic_settings_are_frozen() {
        let env = EnvVars::from_pairs(switchboard_env());
        let settings = load(&switchboard::schema().without_env_file(), &env).unwrap();

        assert!(settings.set("REDIS_PORT", Value::Port(1)).is_err());
        assert_eq!(settings.get("REDIS_PORT"), Some(&Value::Port(6379)));

        let typed = SwitchboardSettings::try_from(&settings).unwrap();
        assert_eq!(typed.public_domain(), "canarytokens.example");
    }

    #[test]
    fn test_effective_config_json_redacted() {
        let env = EnvVars::from_pairs(switchboard_env());
        let settings = load(&switchboard::schema().without_env_file(), &env).unwrap();

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["WG_PRIVATE_KEY_SEED"], REDACTED);
        assert_eq!(json["REDIS_PORT"], 6379);
        assert_eq!(json["SENTRY_ENVIRONMENT"], "local");
    }
}
