// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespaces whose Flux resources must become ready

use crate::constants::{application, flux};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub namespace: String,
    pub resource_name: String,
}

impl Scenario {
    /// The resources created by `flux install` itself
    pub fn flux_system() -> Self {
        Self {
            name: "flux-system".to_string(),
            namespace: flux::SYSTEM.to_string(),
            resource_name: flux::SYSTEM.to_string(),
        }
    }

    /// An application namespace synced from `<scheme>` at ref `<reference>`
    pub fn application(scheme: &str, reference: &str) -> Self {
        Self {
            name: format!("{} from '{}' branch", scheme, reference),
            namespace: format!("{}-{}-{}", application::NAMESPACE_PREFIX, scheme, reference),
            resource_name: application::RESOURCE_NAME.to_string(),
        }
    }
}

/// The application namespaces checked after the core install
pub fn application_scenarios() -> Vec<Scenario> {
    [("https", "main"), ("https", "feature"), ("https", "v1")]
        .into_iter()
        .map(|(scheme, reference)| Scenario::application(scheme, reference))
        .collect()
}
