// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Terraform output keys exposed by the AKS module
pub mod outputs {
    pub const KUBE_CONFIG: &str = "aks_kube_config";
    pub const HOST: &str = "aks_host";
    pub const CLIENT_CERTIFICATE: &str = "aks_client_certificate";
    pub const CLIENT_KEY: &str = "aks_client_key";
    pub const CLUSTER_CA_CERTIFICATE: &str = "aks_cluster_ca_certificate";
}

/// Flux installation settings
pub mod flux {
    /// Namespace and object name used by `flux install`
    pub const SYSTEM: &str = "flux-system";
    /// Optional controllers always enabled on install
    pub const COMPONENTS_EXTRA: [&str; 2] =
        ["image-reflector-controller", "image-automation-controller"];
    /// Hard limit for a single `flux install` invocation
    pub const INSTALL_TIMEOUT_SECS: u64 = 300;
}

/// Application namespaces synced by the fleet repository
pub mod application {
    pub const NAMESPACE_PREFIX: &str = "application-gitops";
    pub const RESOURCE_NAME: &str = "application-gitops";
}

/// Readiness polling schedule
pub mod poll {
    pub const INTERVAL_SECS: u64 = 1;
    pub const TIMEOUT_SECS: u64 = 5;
}

/// Temporary kubeconfig layout
pub mod kubeconfig {
    pub const DIR_SUFFIX: &str = "-azure-e2e";
    pub const FILE_NAME: &str = "kubeconfig";
    /// rwxr-x---
    pub const FILE_MODE: u32 = 0o750;
}

/// Condition type inspected on Flux resources
pub const READY_CONDITION: &str = "Ready";
