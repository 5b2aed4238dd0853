// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Points a freshly installed Flux at a fleet repository over SSH.
//!
//! Creates the deploy key secret, the GitRepository and the Kustomization in
//! that order. Creation stops at the first failure and leaves already created
//! resources in place.

use crate::config::BootstrapConfig;
use crate::constants::flux::SYSTEM;
use crate::error::{E2eError, Result};
use crate::kubernetes::ClusterClient;
use crate::types::gitrepository::{GitRepositoryRef, GitRepositorySpec, LocalObjectReference};
use crate::types::kustomization::{CrossNamespaceSourceReference, KustomizationSpec};
use crate::types::{GitRepository, Kustomization};
use k8s_openapi::api::core::v1::Secret;
use kube::api::{ObjectMeta, PostParams};
use kube::Resource;
use std::collections::BTreeMap;
use tracing::{info, instrument};

const SOURCE_INTERVAL: &str = "1m";
const KUSTOMIZATION_INTERVAL: &str = "10m";

#[derive(Debug, Clone)]
pub struct BootstrapRegistrar {
    config: BootstrapConfig,
}

impl BootstrapRegistrar {
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, client), fields(url = %self.config.url))]
    pub async fn register(&self, client: &ClusterClient) -> Result<()> {
        let private_key = read_key(&self.config.identity_path).await?;
        let public_key = read_key(&self.config.identity_pub_path).await?;
        let pp = PostParams::default();

        client
            .secrets(SYSTEM)
            .create(&pp, &self.secret(&private_key, &public_key))
            .await?;
        info!("Created deploy key secret {}/{}", SYSTEM, SYSTEM);

        client
            .namespaced::<GitRepository>(SYSTEM)?
            .create(&pp, &self.git_repository())
            .await?;
        info!("Created GitRepository {}/{}", SYSTEM, SYSTEM);

        client
            .namespaced::<Kustomization>(SYSTEM)?
            .create(&pp, &self.kustomization())
            .await?;
        info!("Created Kustomization {}/{}", SYSTEM, SYSTEM);

        Ok(())
    }

    pub fn secret(&self, private_key: &str, public_key: &str) -> Secret {
        Secret {
            metadata: system_meta(),
            string_data: Some(BTreeMap::from([
                ("identity".to_string(), private_key.to_string()),
                ("identity.pub".to_string(), public_key.to_string()),
                ("known_hosts".to_string(), self.config.known_hosts.clone()),
            ])),
            ..Default::default()
        }
    }

    pub fn git_repository(&self) -> GitRepository {
        GitRepository {
            metadata: system_meta(),
            spec: GitRepositorySpec {
                url: self.config.url.clone(),
                reference: Some(GitRepositoryRef {
                    branch: Some(self.config.branch.clone()),
                    ..Default::default()
                }),
                secret_ref: Some(LocalObjectReference {
                    name: SYSTEM.to_string(),
                }),
                interval: SOURCE_INTERVAL.to_string(),
                ..Default::default()
            },
            status: None,
        }
    }

    pub fn kustomization(&self) -> Kustomization {
        Kustomization {
            metadata: system_meta(),
            spec: KustomizationSpec {
                path: Some(self.config.path.clone()),
                source_ref: CrossNamespaceSourceReference {
                    api_version: None,
                    kind: GitRepository::kind(&()).to_string(),
                    name: SYSTEM.to_string(),
                    namespace: Some(SYSTEM.to_string()),
                },
                interval: KUSTOMIZATION_INTERVAL.to_string(),
                prune: false,
                ..Default::default()
            },
            status: None,
        }
    }
}

fn system_meta() -> ObjectMeta {
    ObjectMeta {
        name: Some(SYSTEM.to_string()),
        namespace: Some(SYSTEM.to_string()),
        ..Default::default()
    }
}

async fn read_key(path: &std::path::Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| E2eError::BootstrapError(format!("Failed to read {}: {}", path.display(), e)))
}
