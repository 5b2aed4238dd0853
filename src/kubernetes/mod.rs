// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for type registration, client creation, and credential resolution.

pub mod client;
pub mod credentials;
pub mod registry;

pub use client::ClusterClient;
pub use credentials::{
    ClusterCredentials, CredentialResolver, KubeconfigFile, ResolvedCluster,
    TlsCredentialResolver,
};
pub use registry::TypeRegistry;
