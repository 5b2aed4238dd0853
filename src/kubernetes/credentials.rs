// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster credential resolution: temporary kubeconfig file plus typed client

use crate::constants::{kubeconfig, outputs};
use crate::error::{E2eError, Result};
use crate::kubernetes::{client::ClusterClient, registry::TypeRegistry};
use crate::provision::Provisioner;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Connection material for the provisioned cluster
#[derive(Clone)]
pub struct ClusterCredentials {
    pub host: String,
    pub client_certificate: String,
    pub client_key: String,
    pub cluster_ca_certificate: String,
    /// Raw kubeconfig handed to command line tools
    pub kubeconfig: String,
}

impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("host", &self.host)
            .field("client_certificate", &"<pem>")
            .field("client_key", &"<redacted>")
            .field("cluster_ca_certificate", &"<pem>")
            .field("kubeconfig", &"<redacted>")
            .finish()
    }
}

impl ClusterCredentials {
    /// Read the AKS outputs from the provisioner
    pub async fn from_provisioner(provisioner: &dyn Provisioner) -> Result<Self> {
        Ok(Self {
            kubeconfig: provisioner.output(outputs::KUBE_CONFIG).await?,
            host: provisioner.output(outputs::HOST).await?,
            client_certificate: provisioner.output(outputs::CLIENT_CERTIFICATE).await?,
            client_key: provisioner.output(outputs::CLIENT_KEY).await?,
            cluster_ca_certificate: provisioner.output(outputs::CLUSTER_CA_CERTIFICATE).await?,
        })
    }
}

/// A kubeconfig written into its own temporary directory.
/// The directory is removed when this value is dropped.
#[derive(Debug)]
pub struct KubeconfigFile {
    dir: TempDir,
    path: PathBuf,
}

impl KubeconfigFile {
    pub fn write(contents: &str) -> Result<Self> {
        Self::write_in(&std::env::temp_dir(), contents)
    }

    /// Like [`KubeconfigFile::write`], with the directory created under `parent`
    pub fn write_in(parent: &Path, contents: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .suffix(kubeconfig::DIR_SUFFIX)
            .tempdir_in(parent)?;
        let path = dir.path().join(kubeconfig::FILE_NAME);
        std::fs::write(&path, contents)?;
        set_mode(&path)?;
        debug!("Wrote kubeconfig to {}", path.display());
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
fn set_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(kubeconfig::FILE_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> Result<()> {
    Ok(())
}

/// Everything later phases need to talk to the cluster
pub struct ResolvedCluster {
    pub kubeconfig: KubeconfigFile,
    pub client: ClusterClient,
}

/// Turns provisioner outputs into a kubeconfig file and an API client
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, credentials: &ClusterCredentials) -> Result<ResolvedCluster>;
}

/// Resolver that authenticates with the client certificate outputs
#[derive(Debug, Clone, Default)]
pub struct TlsCredentialResolver {
    temp_root: Option<PathBuf>,
}

impl TlsCredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create kubeconfig directories under `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }
}

#[async_trait]
impl CredentialResolver for TlsCredentialResolver {
    #[instrument(skip(self, credentials), fields(host = %credentials.host))]
    async fn resolve(&self, credentials: &ClusterCredentials) -> Result<ResolvedCluster> {
        let kubeconfig = match &self.temp_root {
            Some(root) => KubeconfigFile::write_in(root, &credentials.kubeconfig)?,
            None => KubeconfigFile::write(&credentials.kubeconfig)?,
        };
        check_kubeconfig_server(&credentials.kubeconfig, &credentials.host);

        let registry = TypeRegistry::flux()?;
        let client = create_tls_client(credentials).await?;
        info!("Connected client to {}", credentials.host);

        Ok(ResolvedCluster {
            kubeconfig,
            client: ClusterClient::new(client, registry),
        })
    }
}

/// Build an in-memory kubeconfig carrying the TLS material
pub fn tls_kubeconfig(credentials: &ClusterCredentials) -> Result<Kubeconfig> {
    let host = url::Url::parse(&credentials.host).map_err(|e| {
        E2eError::CredentialError(format!("Invalid API host '{}': {}", credentials.host, e))
    })?;

    serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": "e2e",
            "cluster": {
                "server": host.as_str().trim_end_matches('/'),
                "certificate-authority-data": STANDARD.encode(&credentials.cluster_ca_certificate),
            }
        }],
        "users": [{
            "name": "e2e",
            "user": {
                "client-certificate-data": STANDARD.encode(&credentials.client_certificate),
                "client-key-data": STANDARD.encode(&credentials.client_key),
            }
        }],
        "contexts": [{
            "name": "e2e",
            "context": {"cluster": "e2e", "user": "e2e"}
        }],
        "current-context": "e2e"
    }))
    .map_err(|e| E2eError::CredentialError(format!("Failed to build kubeconfig: {}", e)))
}

async fn create_tls_client(credentials: &ClusterCredentials) -> Result<Client> {
    let kubeconfig = tls_kubeconfig(credentials)?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                E2eError::CredentialError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| E2eError::CredentialError(format!("Failed to create client: {}", e)))
}

/// Warn when the raw kubeconfig points somewhere other than the host output
fn check_kubeconfig_server(raw: &str, host: &str) {
    let parsed: Kubeconfig = match serde_yaml::from_str(raw) {
        Ok(k) => k,
        Err(e) => {
            warn!("Raw kubeconfig could not be parsed: {}", e);
            return;
        }
    };

    match current_server(&parsed) {
        Some(server) if server.trim_end_matches('/') == host.trim_end_matches('/') => {}
        Some(server) => warn!(
            "Kubeconfig server {} differs from host output {}",
            server, host
        ),
        None => warn!("Kubeconfig has no server for its current context"),
    }
}

fn current_server(kubeconfig: &Kubeconfig) -> Option<&str> {
    let cluster_name = match &kubeconfig.current_context {
        Some(current) => kubeconfig
            .contexts
            .iter()
            .find(|c| &c.name == current)
            .and_then(|c| c.context.as_ref())
            .map(|c| c.cluster.as_str()),
        None => kubeconfig.clusters.first().map(|c| c.name.as_str()),
    }?;

    kubeconfig
        .clusters
        .iter()
        .find(|c| c.name == cluster_name)
        .and_then(|c| c.cluster.as_ref())
        .and_then(|c| c.server.as_deref())
}
