//! Boots the fixture environment once from the process environment and prints
//! what was provisioned as JSON.

use anyhow::Context;

use fixture_kit::{telemetry, Config, FixtureEnvironment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid fixture configuration")?;
    telemetry::init(&config);

    tracing::info!(mode = %config.mode, "Provisioning fixture databases...");
    let env = FixtureEnvironment::boot(config)
        .await
        .context("Failed to provision fixture databases")?;

    let report = env.report().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
