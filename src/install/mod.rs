// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GitOps agent installation.

pub mod flux;

pub use flux::FluxCli;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Installs the GitOps agent into the cluster reachable through `kubeconfig`
#[async_trait]
pub trait AgentInstaller: Send + Sync {
    async fn install(&self, kubeconfig: &Path) -> Result<()>;
}
