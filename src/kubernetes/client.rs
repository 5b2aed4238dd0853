// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client bound to an explicit type registry

use crate::error::Result;
use crate::kubernetes::registry::TypeRegistry;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};
use std::sync::Arc;

/// A kube [`Client`] that only hands out APIs for registered custom kinds
#[derive(Clone)]
pub struct ClusterClient {
    client: Client,
    registry: Arc<TypeRegistry>,
}

impl ClusterClient {
    pub fn new(client: Client, registry: TypeRegistry) -> Self {
        Self {
            client,
            registry: Arc::new(registry),
        }
    }

    /// Namespaced API for a registered custom resource kind
    pub fn namespaced<K>(&self, namespace: &str) -> Result<Api<K>>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        self.registry.require::<K>()?;
        Ok(Api::namespaced(self.client.clone(), namespace))
    }

    /// Core Secrets are always available
    pub fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}
