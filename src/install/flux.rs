// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `flux install` wrapper

use super::AgentInstaller;
use crate::constants::flux::{COMPONENTS_EXTRA, INSTALL_TIMEOUT_SECS};
use crate::error::Result;
use crate::process::run_command;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument};

/// Installs the Flux controllers with the image automation extras enabled
#[derive(Debug, Clone)]
pub struct FluxCli {
    binary: String,
    timeout: Duration,
}

impl Default for FluxCli {
    fn default() -> Self {
        Self {
            binary: "flux".to_string(),
            timeout: Duration::from_secs(INSTALL_TIMEOUT_SECS),
        }
    }
}

impl FluxCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn install_args(&self, kubeconfig: &Path) -> Vec<OsString> {
        vec![
            "install".into(),
            "--components-extra".into(),
            COMPONENTS_EXTRA.join(",").into(),
            "--kubeconfig".into(),
            kubeconfig.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl AgentInstaller for FluxCli {
    #[instrument(skip(self), fields(kubeconfig = %kubeconfig.display()))]
    async fn install(&self, kubeconfig: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.install_args(kubeconfig));

        run_command(
            &mut cmd,
            &format!("{} install", self.binary),
            Some(self.timeout),
        )
        .await?;

        info!("Flux installed");
        Ok(())
    }
}
