// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Switchboard settings: channel ports, Redis, alerting and Sentry.

use serde::Serialize;
use url::Url;

use super::coerce::{EmailAddress, FieldKind};
use super::error::ConfigError;
use super::loader;
use super::schema::{FieldDescriptor, Schema};
use super::secret::SecretString;
use super::settings::{Frozen, Settings};
use super::source::EnvVars;
use super::types::{accessors, SentryEnvironment, TokenReturn, ENV_PREFIX, SENTRY_ENVIRONMENTS, TOKEN_RETURNS};
use super::validation;

/// Env file bound to the switchboard schema, relative to the working directory.
pub const SWITCHBOARD_ENV_FILE: &str = "../switchboard/switchboard.env";

static PUBLISHED: Frozen<SwitchboardSettings> = Frozen::new("switchboard");

/// Switchboard field table, in declaration order.
pub fn schema() -> Schema {
    let field = FieldDescriptor::new;
    Schema::new("switchboard", ENV_PREFIX)
        .with_env_file(SWITCHBOARD_ENV_FILE)
        .field(field("PUBLIC_DOMAIN", FieldKind::Str).default_from_env("PUBLIC_DOMAIN", None))
        .field(field("CHANNEL_DNS_IP", FieldKind::Str).with_default(""))
        .field(field("CHANNEL_DNS_PORT", FieldKind::Port).with_default("53"))
        .field(field("CHANNEL_HTTP_PORT", FieldKind::Port).with_default("80"))
        .field(field("CHANNEL_SMTP_PORT", FieldKind::Port).with_default("25"))
        .field(field("CHANNEL_MYSQL_PORT", FieldKind::Port).with_default("3306"))
        .field(field("CHANNEL_MTLS_KUBECONFIG_PORT", FieldKind::Port).with_default("6443"))
        .field(field("CHANNEL_WIREGUARD_PORT", FieldKind::Port).with_default("51820"))
        .field(field("SWITCHBOARD_SCHEME", FieldKind::Str).with_default("https"))
        .field(field("FORCE_HTTPS", FieldKind::Bool).with_default("false"))
        .field(field("REDIS_HOST", FieldKind::Str).default_from_env("REDIS_HOST", Some("localhost")))
        .field(field("REDIS_PORT", FieldKind::Port).with_default("6379"))
        .field(field("REDIS_DB", FieldKind::Str).default_from_env("REDIS_DB", Some("0")))
        .field(field("REDIS_PASSWORD", FieldKind::Secret).default_from_env("REDIS_PASSWORD", Some("auth_disabled")))
        .field(field("REAL_IP_HEADER", FieldKind::Str).with_default("x-real-ip"))
        .field(field("WG_PRIVATE_KEY_SEED", FieldKind::Secret).default_from_env("WG_PRIVATE_KEY_SEED", None))
        .field(field("WG_PRIVATE_KEY_N", FieldKind::Str).with_default("1000"))
        .field(field("FRONTEND_SETTINGS_PATH", FieldKind::Str).with_default("../frontend/frontend.env"))
        .field(field("USING_NGINX", FieldKind::Bool).with_default("true"))
        .field(field("TEMPLATES_PATH", FieldKind::Str).with_default("../templates"))
        .field(field("ALERT_EMAIL_FROM_ADDRESS", FieldKind::Email).with_default("illegal@email.com"))
        .field(field("ALERT_EMAIL_FROM_DISPLAY", FieldKind::Str).with_default("Canarytokens-Test"))
        .field(field("ALERT_EMAIL_SUBJECT", FieldKind::Str).with_default("Canarytokens Alert"))
        .field(field("MAX_ALERTS_PER_MINUTE", FieldKind::Int).with_default("1"))
        // Failures before an alerting mechanism is disabled
        .field(field("MAX_ALERT_FAILURES", FieldKind::Int).with_default("5"))
        .field(field("IPINFO_API_KEY", FieldKind::Secret).optional())
        .field(field("MAILGUN_API_KEY", FieldKind::Secret).optional())
        .field(field("MAILGUN_BASE_URL", FieldKind::Url).with_default("https://api.mailgun.net"))
        .field(field("MAILGUN_DOMAIN_NAME", FieldKind::Str).optional())
        .field(field("SENDGRID_API_KEY", FieldKind::Secret).optional())
        .field(field("SENDGRID_SANDBOX_MODE", FieldKind::Bool).with_default("true"))
        .field(field("SMTP_USERNAME", FieldKind::Str).optional())
        .field(field("SMTP_PASSWORD", FieldKind::Secret).optional())
        .field(field("SMTP_SERVER", FieldKind::Str).optional())
        .field(field("SMTP_PORT", FieldKind::Port).with_default("587"))
        .field(field("SENTRY_DSN", FieldKind::Url).optional())
        .field(field("SENTRY_ENVIRONMENT", FieldKind::Literal(SENTRY_ENVIRONMENTS)).with_default("local"))
        .field(field("SENTRY_ENABLE", FieldKind::Bool).with_default("true"))
        .field(field("SWITCHBOARD_LOG_SIZE", FieldKind::Int).with_default("500000000"))
        .field(field("SWITCHBOARD_LOG_COUNT", FieldKind::Int).with_default("20"))
        .field(field("TOKEN_RETURN", FieldKind::Literal(TOKEN_RETURNS)).with_default("gif"))
        .validate_with(validation::switchboard)
}

/// Validated switchboard configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchboardSettings {
    public_domain: String,
    channel_dns_ip: String,
    channel_dns_port: u16,
    channel_http_port: u16,
    channel_smtp_port: u16,
    channel_mysql_port: u16,
    channel_mtls_kubeconfig_port: u16,
    channel_wireguard_port: u16,
    switchboard_scheme: String,
    force_https: bool,
    redis_host: String,
    redis_port: u16,
    redis_db: String,
    redis_password: SecretString,
    real_ip_header: String,
    wg_private_key_seed: SecretString,
    wg_private_key_n: String,
    frontend_settings_path: String,
    using_nginx: bool,
    templates_path: String,
    alert_email_from_address: EmailAddress,
    alert_email_from_display: String,
    alert_email_subject: String,
    max_alerts_per_minute: i64,
    max_alert_failures: i64,
    ipinfo_api_key: Option<SecretString>,
    mailgun_api_key: Option<SecretString>,
    mailgun_base_url: Url,
    mailgun_domain_name: Option<String>,
    sendgrid_api_key: Option<SecretString>,
    sendgrid_sandbox_mode: bool,
    smtp_username: Option<String>,
    smtp_password: Option<SecretString>,
    smtp_server: Option<String>,
    smtp_port: u16,
    sentry_dsn: Option<Url>,
    sentry_environment: SentryEnvironment,
    sentry_enable: bool,
    switchboard_log_size: i64,
    switchboard_log_count: i64,
    token_return: TokenReturn,
}

accessors! {
    impl SwitchboardSettings {
        copy {
            channel_dns_port: u16,
            channel_http_port: u16,
            channel_smtp_port: u16,
            channel_mysql_port: u16,
            channel_mtls_kubeconfig_port: u16,
            channel_wireguard_port: u16,
            force_https: bool,
            redis_port: u16,
            using_nginx: bool,
            max_alerts_per_minute: i64,
            max_alert_failures: i64,
            sendgrid_sandbox_mode: bool,
            smtp_port: u16,
            sentry_environment: SentryEnvironment,
            sentry_enable: bool,
            switchboard_log_size: i64,
            switchboard_log_count: i64,
            token_return: TokenReturn,
        }
        borrow {
            public_domain: String,
            channel_dns_ip: String,
            switchboard_scheme: String,
            redis_host: String,
            redis_db: String,
            redis_password: SecretString,
            real_ip_header: String,
            wg_private_key_seed: SecretString,
            wg_private_key_n: String,
            frontend_settings_path: String,
            templates_path: String,
            alert_email_from_address: EmailAddress,
            alert_email_from_display: String,
            alert_email_subject: String,
            ipinfo_api_key: Option<SecretString>,
            mailgun_api_key: Option<SecretString>,
            mailgun_base_url: Url,
            mailgun_domain_name: Option<String>,
            sendgrid_api_key: Option<SecretString>,
            smtp_username: Option<String>,
            smtp_password: Option<SecretString>,
            smtp_server: Option<String>,
            sentry_dsn: Option<Url>,
        }
    }
}

impl SwitchboardSettings {
    /// Load from an environment snapshot and the default env file.
    pub fn load(env: &EnvVars) -> Result<Self, ConfigError> {
        Self::load_with(&schema(), env)
    }

    /// Load with a caller-supplied schema, e.g. one bound to another env file.
    pub fn load_with(schema: &Schema, env: &EnvVars) -> Result<Self, ConfigError> {
        let settings = loader::load(schema, env)?;
        Self::try_from(&settings)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&EnvVars::from_process())
    }

    /// Load and publish the process-wide switchboard settings.
    ///
    /// Fails with `FrozenInstance` if settings were already published.
    pub fn init(env: &EnvVars) -> Result<&'static Self, ConfigError> {
        PUBLISHED.publish(Self::load(env)?)
    }

    pub fn global() -> Option<&'static Self> {
        PUBLISHED.get()
    }

    /// `host:port` of the Redis server
    pub fn redis_address(&self) -> String {
        format!("{}:{}", self.redis_host, self.redis_port)
    }

    pub fn mailgun_enabled(&self) -> bool {
        self.mailgun_api_key.is_some() && self.mailgun_domain_name.is_some()
    }

    pub fn sendgrid_enabled(&self) -> bool {
        self.sendgrid_api_key.is_some()
    }

    pub fn smtp_enabled(&self) -> bool {
        self.smtp_server.is_some()
    }
}

impl TryFrom<&Settings> for SwitchboardSettings {
    type Error = ConfigError;

    fn try_from(s: &Settings) -> Result<Self, Self::Error> {
        Ok(Self {
            public_domain: s.get_as("PUBLIC_DOMAIN")?,
            channel_dns_ip: s.get_as("CHANNEL_DNS_IP")?,
            channel_dns_port: s.get_as("CHANNEL_DNS_PORT")?,
            channel_http_port: s.get_as("CHANNEL_HTTP_PORT")?,
            channel_smtp_port: s.get_as("CHANNEL_SMTP_PORT")?,
            channel_mysql_port: s.get_as("CHANNEL_MYSQL_PORT")?,
            channel_mtls_kubeconfig_port: s.get_as("CHANNEL_MTLS_KUBECONFIG_PORT")?,
            channel_wireguard_port: s.get_as("CHANNEL_WIREGUARD_PORT")?,
            switchboard_scheme: s.get_as("SWITCHBOARD_SCHEME")?,
            force_https: s.get_as("FORCE_HTTPS")?,
            redis_host: s.get_as("REDIS_HOST")?,
            redis_port: s.get_as("REDIS_PORT")?,
            redis_db: s.get_as("REDIS_DB")?,
            redis_password: s.get_as("REDIS_PASSWORD")?,
            real_ip_header: s.get_as("REAL_IP_HEADER")?,
            wg_private_key_seed: s.get_as("WG_PRIVATE_KEY_SEED")?,
            wg_private_key_n: s.get_as("WG_PRIVATE_KEY_N")?,
            frontend_settings_path: s.get_as("FRONTEND_SETTINGS_PATH")?,
            using_nginx: s.get_as("USING_NGINX")?,
            templates_path: s.get_as("TEMPLATES_PATH")?,
            alert_email_from_address: s.get_as("ALERT_EMAIL_FROM_ADDRESS")?,
            alert_email_from_display: s.get_as("ALERT_EMAIL_FROM_DISPLAY")?,
            alert_email_subject: s.get_as("ALERT_EMAIL_SUBJECT")?,
            max_alerts_per_minute: s.get_as("MAX_ALERTS_PER_MINUTE")?,
            max_alert_failures: s.get_as("MAX_ALERT_FAILURES")?,
            ipinfo_api_key: s.get_as("IPINFO_API_KEY")?,
            mailgun_api_key: s.get_as("MAILGUN_API_KEY")?,
            mailgun_base_url: s.get_as("MAILGUN_BASE_URL")?,
            mailgun_domain_name: s.get_as("MAILGUN_DOMAIN_NAME")?,
            sendgrid_api_key: s.get_as("SENDGRID_API_KEY")?,
            sendgrid_sandbox_mode: s.get_as("SENDGRID_SANDBOX_MODE")?,
            smtp_username: s.get_as("SMTP_USERNAME")?,
            smtp_password: s.get_as("SMTP_PASSWORD")?,
            smtp_server: s.get_as("SMTP_SERVER")?,
            smtp_port: s.get_as("SMTP_PORT")?,
            sentry_dsn: s.get_as("SENTRY_DSN")?,
            sentry_environment: s.get_as("SENTRY_ENVIRONMENT")?,
            sentry_enable: s.get_as("SENTRY_ENABLE")?,
            switchboard_log_size: s.get_as("SWITCHBOARD_LOG_SIZE")?,
            switchboard_log_count: s.get_as("SWITCHBOARD_LOG_COUNT")?,
            token_return: s.get_as("TOKEN_RETURN")?,
        })
    }
}
