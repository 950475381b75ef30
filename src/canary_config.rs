// BSD 3-Clause License
// Copyright (c) 2025, NØNOS - NOXTERM
//
// Prints the effective switchboard or frontend configuration as JSON.
// Secrets are redacted.

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use canary_settings::config::{EnvVars, FrontendSettings, SwitchboardSettings};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("canary_settings=info")
        .json()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let service = std::env::args().nth(1).unwrap_or_else(|| "switchboard".to_string());
    let env = EnvVars::from_process();
    info!(
        "canary-config v{} loading {} settings ({} environment variables)",
        canary_settings::VERSION,
        service,
        env.len()
    );

    let rendered = match service.as_str() {
        "switchboard" => {
            let settings = SwitchboardSettings::init(&env).map_err(|e| {
                error!("Switchboard settings are invalid: {}", e);
                e
            })?;
            serde_json::to_string_pretty(settings)
        }
        "frontend" => {
            let settings = FrontendSettings::init(&env).map_err(|e| {
                error!("Frontend settings are invalid: {}", e);
                e
            })?;
            serde_json::to_string_pretty(settings)
        }
        other => bail!("Unknown service {}, expected switchboard or frontend", other),
    }
    .context("Failed to render settings as JSON")?;

    println!("{}", rendered);
    Ok(())
}
