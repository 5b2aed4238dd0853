// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{flux, poll};
use crate::driver::poll::PollSchedule;

/// End-to-end run configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the AKS terraform module
    pub terraform_dir: PathBuf,
    pub terraform_binary: String,
    /// Tear the cluster down after the run; off by default so failed runs can be inspected
    pub destroy_on_exit: bool,
    pub flux_binary: String,
    pub install_timeout: Duration,
    pub poll: PollSchedule,
    /// Stop polling as soon as the API reports a transport error
    pub fail_fast: bool,
    pub bootstrap: Option<BootstrapConfig>,
}

/// Fleet repository settings for the bootstrap strategy
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub identity_path: PathBuf,
    pub identity_pub_path: PathBuf,
    pub known_hosts: String,
    pub url: String,
    pub branch: String,
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            terraform_dir: PathBuf::from("./terraform"),
            terraform_binary: "terraform".to_string(),
            destroy_on_exit: false,
            flux_binary: "flux".to_string(),
            install_timeout: Duration::from_secs(flux::INSTALL_TIMEOUT_SECS),
            poll: PollSchedule::new(
                Duration::from_secs(poll::INTERVAL_SECS),
                Duration::from_secs(poll::TIMEOUT_SECS),
            ),
            fail_fast: false,
            bootstrap: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let interval = parse_or(&lookup, "E2E_POLL_INTERVAL_SECS", poll::INTERVAL_SECS)?;
        let timeout = parse_or(&lookup, "E2E_POLL_TIMEOUT_SECS", poll::TIMEOUT_SECS)?;
        if interval == 0 {
            bail!("E2E_POLL_INTERVAL_SECS must be greater than zero");
        }

        let bootstrap = if parse_or(&lookup, "E2E_BOOTSTRAP", false)? {
            Some(BootstrapConfig::from_lookup(&lookup)?)
        } else {
            None
        };

        Ok(Config {
            terraform_dir: lookup("E2E_TERRAFORM_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.terraform_dir),
            terraform_binary: lookup("E2E_TERRAFORM_BINARY").unwrap_or(defaults.terraform_binary),
            destroy_on_exit: parse_or(&lookup, "E2E_DESTROY_ON_EXIT", false)?,
            flux_binary: lookup("E2E_FLUX_BINARY").unwrap_or(defaults.flux_binary),
            install_timeout: Duration::from_secs(parse_or(
                &lookup,
                "E2E_INSTALL_TIMEOUT_SECS",
                flux::INSTALL_TIMEOUT_SECS,
            )?),
            poll: PollSchedule::new(Duration::from_secs(interval), Duration::from_secs(timeout)),
            fail_fast: parse_or(&lookup, "E2E_FAIL_FAST", false)?,
            bootstrap,
        })
    }
}

impl BootstrapConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let identity_path = lookup("E2E_BOOTSTRAP_IDENTITY")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("../../../id_rsa"));
        let identity_pub_path = lookup("E2E_BOOTSTRAP_IDENTITY_PUB")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let mut path = identity_path.clone().into_os_string();
                path.push(".pub");
                PathBuf::from(path)
            });

        Ok(BootstrapConfig {
            identity_path,
            identity_pub_path,
            known_hosts: lookup("E2E_BOOTSTRAP_KNOWN_HOSTS")
                .context("E2E_BOOTSTRAP_KNOWN_HOSTS environment variable not set")?,
            url: lookup("E2E_BOOTSTRAP_URL")
                .context("E2E_BOOTSTRAP_URL environment variable not set")?,
            branch: lookup("E2E_BOOTSTRAP_BRANCH").unwrap_or_else(|| "main".to_string()),
            path: lookup("E2E_BOOTSTRAP_PATH").unwrap_or_else(|| "./clusters/prod".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", value, key)),
        None => Ok(default),
    }
}
