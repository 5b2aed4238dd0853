// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! External command execution

use crate::error::{E2eError, Result};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Run a command to completion, optionally bounded by a timeout.
///
/// The child is killed when the timeout elapses. A non-zero exit status is an error
/// carrying the command's stderr.
pub async fn run_command(
    cmd: &mut Command,
    description: &str,
    timeout: Option<Duration>,
) -> Result<Output> {
    info!("Running {}", description);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, cmd.output())
            .await
            .map_err(|_| {
                warn!("{} timed out after {:?}", description, limit);
                E2eError::CommandTimeout {
                    command: description.to_string(),
                    timeout: limit,
                }
            })?,
        None => cmd.output().await,
    }
    .map_err(|source| E2eError::CommandSpawn {
        command: description.to_string(),
        source,
    })?;

    if output.status.success() {
        debug!("{} succeeded", description);
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{} failed: {}", description, stderr);
        Err(E2eError::CommandFailed {
            command: description.to_string(),
            status: output.status.to_string(),
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command_returns_stdout() {
        let output = run_command(Command::new("sh").args(["-c", "echo ok"]), "echo", None)
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ok");
    }

    #[tokio::test]
    async fn test_failed_command_carries_stderr() {
        let err = run_command(
            Command::new("sh").args(["-c", "echo boom >&2; exit 3"]),
            "failing",
            None,
        )
        .await
        .unwrap_err();

        match err {
            E2eError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let err = run_command(
            Command::new("sleep").arg("5"),
            "sleep",
            Some(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, E2eError::CommandTimeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let err = run_command(&mut Command::new("/nonexistent/terraform"), "missing", None)
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::CommandSpawn { .. }));
    }
}
