// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Explicit registry of the custom resource kinds a client may address

use crate::error::{E2eError, Result};
use crate::types::{GitRepository, Kustomization};
use kube::{api::ApiResource, Resource};
use std::collections::BTreeMap;
use tracing::debug;

/// Custom resource kinds known to a [`ClusterClient`](super::ClusterClient).
///
/// Each client owns its registry, so separate runs never share registration state.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    kinds: BTreeMap<String, ApiResource>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Flux source and kustomize kinds
    pub fn flux() -> Result<Self> {
        let mut registry = Self::new();
        registry.register::<GitRepository>()?;
        registry.register::<Kustomization>()?;
        Ok(registry)
    }

    /// Register a kind. Registering the same resource twice is a no-op,
    /// registering a different resource under an existing key is an error.
    pub fn register<K>(&mut self) -> Result<()>
    where
        K: Resource<DynamicType = ()>,
    {
        let resource = ApiResource::erase::<K>(&());
        let key = gvk_key(&resource.api_version, &resource.kind);

        match self.kinds.get(&key) {
            Some(existing) if *existing == resource => Ok(()),
            Some(existing) => Err(E2eError::RegistryError(format!(
                "{} already registered with plural '{}'",
                key, existing.plural
            ))),
            None => {
                debug!("Registering {} ({})", key, resource.plural);
                self.kinds.insert(key, resource);
                Ok(())
            }
        }
    }

    pub fn contains<K>(&self) -> bool
    where
        K: Resource<DynamicType = ()>,
    {
        self.kinds
            .contains_key(&gvk_key(&K::api_version(&()), &K::kind(&())))
    }

    /// Fail unless the kind has been registered
    pub fn require<K>(&self) -> Result<()>
    where
        K: Resource<DynamicType = ()>,
    {
        if self.contains::<K>() {
            Ok(())
        } else {
            Err(E2eError::RegistryError(format!(
                "{} is not registered",
                gvk_key(&K::api_version(&()), &K::kind(&()))
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn gvk_key(api_version: &str, kind: &str) -> String {
    format!("{}/{}", api_version, kind)
}
