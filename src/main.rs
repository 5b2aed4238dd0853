// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use flux_aks_e2e::config::Config;
use flux_aks_e2e::driver::E2eDriver;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Flux AKS end-to-end run");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: terraform_dir={}, destroy_on_exit={}, bootstrap={}",
        config.terraform_dir.display(),
        config.destroy_on_exit,
        config.bootstrap.is_some()
    );

    let report = E2eDriver::from_config(config).run().await?;

    for result in &report.results {
        match &result.outcome {
            Ok(attempts) => info!("PASS {} ({} attempts)", result.scenario.name, attempts),
            Err(e) => error!("FAIL {}: {}", result.scenario.name, e),
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{} of {} scenarios failed", failed, report.results.len());
    }

    info!("All scenarios passed");
    Ok(())
}
