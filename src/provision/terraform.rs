// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Terraform CLI driver

use super::Provisioner;
use crate::error::{E2eError, Result};
use crate::process::run_command;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Failures worth another attempt: provider/module downloads and flaky connections
const RETRYABLE_ERRORS: &[&str] = &[
    "Failed to query available provider packages",
    "Failed to install provider",
    "Error installing provider",
    "Could not download module",
    "could not query provider registry",
    "connection reset by peer",
    "TLS handshake timeout",
    "timeout while waiting for state to become",
    "Client.Timeout exceeded while awaiting headers",
    "unexpected EOF",
];

const MAX_RETRIES: u32 = 3;
const TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Retry policy for terraform invocations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: TIME_BETWEEN_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Terraform {
    dir: PathBuf,
    binary: String,
    retry: RetryPolicy,
}

impl Terraform {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            binary: "terraform".to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run `terraform <args>`, retrying known transient failures
    async fn run(&self, args: &[&str]) -> Result<Output> {
        let description = format!("{} {}", self.binary, args.join(" "));
        let mut attempt = 0;

        loop {
            let mut cmd = Command::new(&self.binary);
            cmd.args(args).current_dir(&self.dir);

            match run_command(&mut cmd, &description, None).await {
                Ok(output) => return Ok(output),
                Err(E2eError::CommandFailed { stderr, .. })
                    if attempt < self.retry.max_retries && is_retryable(&stderr) =>
                {
                    attempt += 1;
                    warn!(
                        "{} hit a retryable error (attempt {}/{}), retrying in {:?}",
                        description, attempt, self.retry.max_retries, self.retry.delay
                    );
                    sleep(self.retry.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Provisioner for Terraform {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn init_and_apply(&self) -> Result<()> {
        self.run(&["init", "-input=false", "-no-color"]).await?;
        self.run(&["apply", "-input=false", "-auto-approve", "-no-color"])
            .await?;
        info!("Terraform apply complete");
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn output(&self, key: &str) -> Result<String> {
        let output = self.run(&["output", "-json", "-no-color"]).await?;
        parse_output(&output.stdout, key)
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn destroy(&self) -> Result<()> {
        self.run(&["destroy", "-auto-approve", "-input=false", "-no-color"])
            .await?;
        info!("Terraform destroy complete");
        Ok(())
    }
}

fn is_retryable(stderr: &str) -> bool {
    RETRYABLE_ERRORS.iter().any(|pattern| stderr.contains(pattern))
}

/// Extract one value from `terraform output -json`
pub fn parse_output(stdout: &[u8], key: &str) -> Result<String> {
    let outputs: serde_json::Map<String, Value> = serde_json::from_slice(stdout)
        .map_err(|e| E2eError::OutputParse(format!("terraform output is not JSON: {}", e)))?;

    let entry = outputs
        .get(key)
        .ok_or_else(|| E2eError::OutputMissing(key.to_string()))?;

    match entry.get("value") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(E2eError::OutputParse(format!(
            "output '{}' has no value",
            key
        ))),
    }
}
