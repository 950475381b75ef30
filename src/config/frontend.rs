// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
//! Frontend settings: domains, static files, uploads and third-party APIs.

use serde::Serialize;
use url::Url;

use super::coerce::FieldKind;
use super::error::ConfigError;
use super::loader;
use super::schema::{comma_separated, FieldDescriptor, Schema};
use super::secret::SecretString;
use super::settings::{Frozen, Settings};
use super::source::EnvVars;
use super::types::{accessors, SentryEnvironment, ENV_PREFIX, SENTRY_ENVIRONMENTS};
use super::validation;

/// Env file bound to the frontend schema, relative to the working directory.
pub const FRONTEND_ENV_FILE: &str = "../frontend/frontend.env";

static PUBLISHED: Frozen<FrontendSettings> = Frozen::new("frontend");

/// Frontend field table, in declaration order.
///
/// `DOMAINS` and `NXDOMAINS` are comma-separated lists, e.g.
/// `CANARY_DOMAINS=example.com,example.org`.
pub fn schema() -> Schema {
    let field = FieldDescriptor::new;
    Schema::new("frontend", ENV_PREFIX)
        .with_env_file(FRONTEND_ENV_FILE)
        .field(field("API_APP_TITLE", FieldKind::Str).with_default("Canarytokens"))
        .field(field("API_VERSION_STR", FieldKind::Str).with_default("v1"))
        .field(field("PUBLIC_IP", FieldKind::Str))
        .field(field("DOMAINS", FieldKind::List))
        .field(field("NXDOMAINS", FieldKind::List))
        .field(field("SWITCHBOARD_SETTINGS_PATH", FieldKind::Str).with_default("../switchboard/switchboard.env"))
        .field(field("SENTRY_DSN", FieldKind::Url).optional())
        .field(field("SENTRY_ENVIRONMENT", FieldKind::Literal(SENTRY_ENVIRONMENTS)).with_default("local"))
        .field(field("SENTRY_ENABLE", FieldKind::Bool).with_default("true"))
        .field(field("TEMPLATES_PATH", FieldKind::Str).with_default("../templates"))
        .field(field("STATIC_FILES_PATH", FieldKind::Str).with_default("../templates/static"))
        .field(field("STATIC_FILES_APPLICATION_SUB_PATH", FieldKind::Str).with_default("/resources"))
        .field(field("STATIC_FILES_APPLICATION_INTERNAL_NAME", FieldKind::Str).with_default("resources"))
        // API docs are served only when set; must start with a `/`
        .field(field("API_REDOC_URL", FieldKind::Str).optional())
        .field(field("MAX_UPLOAD_SIZE", FieldKind::Int).with_default("1048576"))
        .field(field("WEB_IMAGE_UPLOAD_PATH", FieldKind::Str).with_default("/uploads"))
        .field(field("FRONTEND_LOG_SIZE", FieldKind::Int).with_default("500000000"))
        .field(field("FRONTEND_LOG_COUNT", FieldKind::Int).with_default("20"))
        .field(field("DEV_BUILD_ID", FieldKind::Str).optional())
        .field(field("AWSID_URL", FieldKind::Url).optional())
        .field(field("TESTING_AWS_ACCESS_KEY_ID", FieldKind::Str).with_default(""))
        .field(field("TESTING_AWS_SECRET_ACCESS_KEY", FieldKind::Secret).with_default(""))
        .field(field("TESTING_AWS_REGION", FieldKind::Str).with_default("us-east-2"))
        .field(field("TESTING_AWS_OUTPUT", FieldKind::Str).with_default("json"))
        .field(field("AZURE_ID_TOKEN_URL", FieldKind::Url).optional())
        .field(field("AZURE_ID_TOKEN_AUTH", FieldKind::Secret).optional())
        .field(field("GOOGLE_API_KEY", FieldKind::Secret).optional())
        .field(field("EXTEND_EMAIL", FieldKind::Str).optional())
        .field(field("EXTEND_PASSWORD", FieldKind::Secret).with_default("NoExtendPasswordFound"))
        .field(field("EXTEND_CARD_NAME", FieldKind::Str).optional())
        .field(field("CLOUDFRONT_URL", FieldKind::Url).optional())
        .field(field("AZUREAPP_ID", FieldKind::Str).optional())
        .field(field("AZUREAPP_SECRET", FieldKind::Secret).optional())
        .field(field("ST_OAUTH_TOKEN", FieldKind::Secret).default_from_env("ST_OAUTH_TOKEN", None))
        .parse_override("DOMAINS", comma_separated)
        .parse_override("NXDOMAINS", comma_separated)
        .validate_with(validation::frontend)
}

/// Validated frontend configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendSettings {
    api_app_title: String,
    api_version_str: String,
    public_ip: String,
    domains: Vec<String>,
    nxdomains: Vec<String>,
    switchboard_settings_path: String,
    sentry_dsn: Option<Url>,
    sentry_environment: SentryEnvironment,
    sentry_enable: bool,
    templates_path: String,
    static_files_path: String,
    static_files_application_sub_path: String,
    static_files_application_internal_name: String,
    api_redoc_url: Option<String>,
    max_upload_size: i64,
    web_image_upload_path: String,
    frontend_log_size: i64,
    frontend_log_count: i64,
    dev_build_id: Option<String>,
    awsid_url: Option<Url>,
    testing_aws_access_key_id: String,
    testing_aws_secret_access_key: SecretString,
    testing_aws_region: String,
    testing_aws_output: String,
    azure_id_token_url: Option<Url>,
    azure_id_token_auth: Option<SecretString>,
    google_api_key: Option<SecretString>,
    extend_email: Option<String>,
    extend_password: SecretString,
    extend_card_name: Option<String>,
    cloudfront_url: Option<Url>,
    azureapp_id: Option<String>,
    azureapp_secret: Option<SecretString>,
    st_oauth_token: SecretString,
}

accessors! {
    impl FrontendSettings {
        copy {
            sentry_environment: SentryEnvironment,
            sentry_enable: bool,
            max_upload_size: i64,
            frontend_log_size: i64,
            frontend_log_count: i64,
        }
        borrow {
            api_app_title: String,
            api_version_str: String,
            public_ip: String,
            domains: [String],
            nxdomains: [String],
            switchboard_settings_path: String,
            sentry_dsn: Option<Url>,
            templates_path: String,
            static_files_path: String,
            static_files_application_sub_path: String,
            static_files_application_internal_name: String,
            api_redoc_url: Option<String>,
            web_image_upload_path: String,
            dev_build_id: Option<String>,
            awsid_url: Option<Url>,
            testing_aws_access_key_id: String,
            testing_aws_secret_access_key: SecretString,
            testing_aws_region: String,
            testing_aws_output: String,
            azure_id_token_url: Option<Url>,
            azure_id_token_auth: Option<SecretString>,
            google_api_key: Option<SecretString>,
            extend_email: Option<String>,
            extend_password: SecretString,
            extend_card_name: Option<String>,
            cloudfront_url: Option<Url>,
            azureapp_id: Option<String>,
            azureapp_secret: Option<SecretString>,
            st_oauth_token: SecretString,
        }
    }
}

impl FrontendSettings {
    /// Load from an environment snapshot and the default env file.
    pub fn load(env: &EnvVars) -> Result<Self, ConfigError> {
        Self::load_with(&schema(), env)
    }

    pub fn load_with(schema: &Schema, env: &EnvVars) -> Result<Self, ConfigError> {
        let settings = loader::load(schema, env)?;
        Self::try_from(&settings)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&EnvVars::from_process())
    }

    /// Load and publish the process-wide frontend settings.
    pub fn init(env: &EnvVars) -> Result<&'static Self, ConfigError> {
        PUBLISHED.publish(Self::load(env)?)
    }

    pub fn global() -> Option<&'static Self> {
        PUBLISHED.get()
    }

    /// First configured canarytoken domain
    pub fn primary_domain(&self) -> &str {
        self.domains.first().map(String::as_str).unwrap_or_default()
    }

    pub fn api_docs_enabled(&self) -> bool {
        self.api_redoc_url.is_some()
    }
}

impl TryFrom<&Settings> for FrontendSettings {
    type Error = ConfigError;

    fn try_from(s: &Settings) -> Result<Self, Self::Error> {
        Ok(Self {
            api_app_title: s.get_as("API_APP_TITLE")?,
            api_version_str: s.get_as("API_VERSION_STR")?,
            public_ip: s.get_as("PUBLIC_IP")?,
            domains: s.get_as("DOMAINS")?,
            nxdomains: s.get_as("NXDOMAINS")?,
            switchboard_settings_path: s.get_as("SWITCHBOARD_SETTINGS_PATH")?,
            sentry_dsn: s.get_as("SENTRY_DSN")?,
            sentry_environment: s.get_as("SENTRY_ENVIRONMENT")?,
            sentry_enable: s.get_as("SENTRY_ENABLE")?,
            templates_path: s.get_as("TEMPLATES_PATH")?,
            static_files_path: s.get_as("STATIC_FILES_PATH")?,
            static_files_application_sub_path: s.get_as("STATIC_FILES_APPLICATION_SUB_PATH")?,
            static_files_application_internal_name: s.get_as("STATIC_FILES_APPLICATION_INTERNAL_NAME")?,
            api_redoc_url: s.get_as("API_REDOC_URL")?,
            max_upload_size: s.get_as("MAX_UPLOAD_SIZE")?,
            web_image_upload_path: s.get_as("WEB_IMAGE_UPLOAD_PATH")?,
            frontend_log_size: s.get_as("FRONTEND_LOG_SIZE")?,
            frontend_log_count: s.get_as("FRONTEND_LOG_COUNT")?,
            dev_build_id: s.get_as("DEV_BUILD_ID")?,
            awsid_url: s.get_as("AWSID_URL")?,
            testing_aws_access_key_id: s.get_as("TESTING_AWS_ACCESS_KEY_ID")?,
            testing_aws_secret_access_key: s.get_as("TESTING_AWS_SECRET_ACCESS_KEY")?,
            testing_aws_region: s.get_as("TESTING_AWS_REGION")?,
            testing_aws_output: s.get_as("TESTING_AWS_OUTPUT")?,
            azure_id_token_url: s.get_as("AZURE_ID_TOKEN_URL")?,
            azure_id_token_auth: s.get_as("AZURE_ID_TOKEN_AUTH")?,
            google_api_key: s.get_as("GOOGLE_API_KEY")?,
            extend_email: s.get_as("EXTEND_EMAIL")?,
            extend_password: s.get_as("EXTEND_PASSWORD")?,
            extend_card_name: s.get_as("EXTEND_CARD_NAME")?,
            cloudfront_url: s.get_as("CLOUDFRONT_URL")?,
            azureapp_id: s.get_as("AZUREAPP_ID")?,
            azureapp_secret: s.get_as("AZUREAPP_SECRET")?,
            st_oauth_token: s.get_as("ST_OAUTH_TOKEN")?,
        })
    }
}
