// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

use crate::driver::poll::PollError;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to build cluster credentials: {0}")]
    CredentialError(String),

    #[error("Type registry error: {0}")]
    RegistryError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to execute {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{command} timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Provisioner output '{0}' not found")]
    OutputMissing(String),

    #[error("Invalid provisioner output: {0}")]
    OutputParse(String),

    #[error("Bootstrap failed: {0}")]
    BootstrapError(String),

    #[error("Flux core components not ready: {0}")]
    CoreNotReady(#[source] PollError),
}

pub type Result<T> = std::result::Result<T, E2eError>;
