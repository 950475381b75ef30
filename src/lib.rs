// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
// Canarytokens settings library
// Typed, immutable configuration for the switchboard and frontend services

pub mod config;

pub use config::{ConfigError, EnvVars, FrontendSettings, Settings, SwitchboardSettings};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
