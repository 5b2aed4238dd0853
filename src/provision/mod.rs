// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Infrastructure provisioning lifecycle.

pub mod terraform;

pub use terraform::Terraform;

use crate::error::Result;
use async_trait::async_trait;

/// An infrastructure-as-code tool that creates and destroys the target cluster
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Initialize the working directory and apply the declared infrastructure.
    /// Applying already provisioned infrastructure must succeed unchanged.
    async fn init_and_apply(&self) -> Result<()>;

    /// Look up a named output value
    async fn output(&self, key: &str) -> Result<String>;

    async fn destroy(&self) -> Result<()>;
}
