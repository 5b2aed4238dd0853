// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Readiness checks for GitRepository/Kustomization pairs

use crate::constants::READY_CONDITION;
use crate::kubernetes::ClusterClient;
use crate::types::{GitRepository, HasConditions, Kustomization};
use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::{debug, instrument};

/// Outcome of a single readiness check
#[derive(Debug)]
pub enum Readiness {
    /// Both resources exist and neither reports Ready=False
    Ready,
    /// A resource is missing or reports Ready=False
    NotReady(String),
    /// The API could not be reached or rejected the request
    TransportError(crate::error::E2eError),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Ready => write!(f, "ready"),
            Readiness::NotReady(reason) => write!(f, "not ready: {}", reason),
            Readiness::TransportError(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Check the GitRepository and Kustomization sharing `namespace/name`
#[instrument(skip(client))]
pub async fn verify_git_and_kustomization(
    client: &ClusterClient,
    namespace: &str,
    name: &str,
) -> Readiness {
    let source = match fetch::<GitRepository>(client, namespace, name).await {
        Ok(source) => source,
        Err(outcome) => return outcome,
    };
    if let Some(reason) = failed_ready(&source) {
        return Readiness::NotReady(reason);
    }

    let kustomization = match fetch::<Kustomization>(client, namespace, name).await {
        Ok(kustomization) => kustomization,
        Err(outcome) => return outcome,
    };
    if let Some(reason) = failed_ready(&kustomization) {
        return Readiness::NotReady(reason);
    }

    debug!(
        "GitRepository and Kustomization {}/{} are ready (revision {})",
        namespace,
        name,
        source.artifact_revision().unwrap_or("unknown")
    );
    Readiness::Ready
}

async fn fetch<K>(
    client: &ClusterClient,
    namespace: &str,
    name: &str,
) -> std::result::Result<K, Readiness>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + fmt::Debug,
{
    let api = client
        .namespaced::<K>(namespace)
        .map_err(Readiness::TransportError)?;

    match api.get(name).await {
        Ok(resource) => Ok(resource),
        Err(kube::Error::Api(err)) if err.code == 404 => Err(Readiness::NotReady(format!(
            "{} {}/{} not found",
            K::kind(&()),
            namespace,
            name
        ))),
        Err(e) => Err(Readiness::TransportError(e.into())),
    }
}

fn failed_ready<K>(resource: &K) -> Option<String>
where
    K: HasConditions + Resource<DynamicType = ()>,
{
    resource.failed_condition(READY_CONDITION).map(|c| {
        format!(
            "{} {}/{} {}",
            K::kind(&()),
            resource.namespace().unwrap_or_default(),
            resource.name_any(),
            c.describe()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kubernetes::TypeRegistry;
    use crate::test_utils::{
        git_repository_json, git_repository_path, kustomization_json, kustomization_path,
        MockService,
    };

    fn client(mock: MockService) -> ClusterClient {
        ClusterClient::new(mock.into_client(), TypeRegistry::flux().unwrap())
    }

    fn mock_with(
        ns: &str,
        name: &str,
        git_ready: Option<&str>,
        ks_ready: Option<&str>,
    ) -> MockService {
        MockService::new()
            .on_get(
                &git_repository_path(ns, name),
                200,
                &git_repository_json(ns, name, git_ready),
            )
            .on_get(
                &kustomization_path(ns, name),
                200,
                &kustomization_json(ns, name, ks_ready),
            )
    }

    #[tokio::test]
    async fn test_ready_when_both_true() {
        let client = client(mock_with("flux-system", "flux-system", Some("True"), Some("True")));
        let outcome = verify_git_and_kustomization(&client, "flux-system", "flux-system").await;
        assert!(outcome.is_ready(), "{outcome}");
    }

    #[tokio::test]
    async fn test_ready_when_unknown_or_absent() {
        let client = client(mock_with("flux-system", "flux-system", Some("Unknown"), None));
        let outcome = verify_git_and_kustomization(&client, "flux-system", "flux-system").await;
        assert!(outcome.is_ready(), "{outcome}");
    }

    #[tokio::test]
    async fn test_not_ready_when_source_false() {
        let client = client(mock_with("flux-system", "flux-system", Some("False"), Some("True")));
        let outcome = verify_git_and_kustomization(&client, "flux-system", "flux-system").await;
        match outcome {
            Readiness::NotReady(reason) => {
                assert!(reason.starts_with("GitRepository flux-system/flux-system"))
            }
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn test_not_ready_when_kustomization_false() {
        let client = client(mock_with("flux-system", "flux-system", Some("True"), Some("False")));
        let outcome = verify_git_and_kustomization(&client, "flux-system", "flux-system").await;
        match outcome {
            Readiness::NotReady(reason) => assert!(reason.starts_with("Kustomization")),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_source_is_not_ready() {
        let client = client(MockService::new());
        let outcome = verify_git_and_kustomization(
            &client,
            "application-gitops-https-main",
            "application-gitops",
        )
        .await;
        match outcome {
            Readiness::NotReady(reason) => assert_eq!(
                reason,
                "GitRepository application-gitops-https-main/application-gitops not found"
            ),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_kustomization_is_not_ready() {
        let (ns, name) = ("application-gitops-https-v1", "application-gitops");
        let mock = MockService::new().on_get(
            &git_repository_path(ns, name),
            200,
            &git_repository_json(ns, name, Some("True")),
        );
        let outcome = verify_git_and_kustomization(&client(mock), ns, name).await;
        match outcome {
            Readiness::NotReady(reason) => assert_eq!(
                reason,
                "Kustomization application-gitops-https-v1/application-gitops not found"
            ),
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failed_source_skips_kustomization_lookup() {
        let mock = mock_with("flux-system", "flux-system", Some("False"), Some("True"));
        let client = client(mock.clone());

        let outcome = verify_git_and_kustomization(&client, "flux-system", "flux-system").await;
        assert!(matches!(outcome, Readiness::NotReady(_)), "{outcome}");

        let requests = mock.requests();
        assert_eq!(
            requests,
            [(
                "GET".to_string(),
                git_repository_path("flux-system", "flux-system")
            )]
        );
    }

    #[tokio::test]
    async fn test_server_error_is_transport_error() {
        let mock = MockService::new().on_get(
            &git_repository_path("flux-system", "flux-system"),
            403,
            &serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "status": "Failure",
                "message": "forbidden",
                "reason": "Forbidden",
                "code": 403
            })
            .to_string(),
        );
        let outcome =
            verify_git_and_kustomization(&client(mock), "flux-system", "flux-system").await;
        assert!(matches!(outcome, Readiness::TransportError(_)));
    }

    #[tokio::test]
    async fn test_unregistered_kinds_are_transport_errors() {
        let client = ClusterClient::new(MockService::new().into_client(), TypeRegistry::new());
        let outcome = verify_git_and_kustomization(&client, "flux-system", "flux-system").await;
        assert!(matches!(outcome, Readiness::TransportError(_)));
    }
}
