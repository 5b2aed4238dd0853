// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::condition::{Condition, HasConditions};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "source.toolkit.fluxcd.io", version = "v1", kind = "GitRepository")]
#[kube(namespaced)]
#[kube(status = "GitRepositoryStatus")]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    pub url: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<GitRepositoryRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,
    pub interval: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend: Option<bool>,
}

/// Revision to check out; Flux picks the first of commit, name, semver, tag, branch
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct LocalObjectReference {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositoryStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl HasConditions for GitRepository {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }
}

impl GitRepository {
    /// Revision of the last fetched artifact, if any
    pub fn artifact_revision(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.artifact.as_ref())
            .and_then(|a| a.revision.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_flux_object() {
        let repo: GitRepository = serde_json::from_value(json!({
            "apiVersion": "source.toolkit.fluxcd.io/v1",
            "kind": "GitRepository",
            "metadata": {"name": "flux-system", "namespace": "flux-system"},
            "spec": {
                "url": "https://github.com/example/fleet",
                "ref": {"branch": "main"},
                "secretRef": {"name": "flux-system"},
                "interval": "1m0s"
            },
            "status": {
                "observedGeneration": 1,
                "artifact": {"revision": "main@sha1:abc123"},
                "conditions": [{
                    "type": "Ready",
                    "status": "True",
                    "reason": "Succeeded",
                    "message": "stored artifact",
                    "lastTransitionTime": "2026-01-01T00:00:00Z"
                }]
            }
        }))
        .unwrap();

        assert_eq!(
            repo.spec.reference.as_ref().unwrap().branch.as_deref(),
            Some("main")
        );
        assert_eq!(repo.spec.secret_ref.as_ref().unwrap().name, "flux-system");
        assert_eq!(repo.conditions().len(), 1);
    }

    #[test]
    fn test_conditions_without_status() {
        let repo = GitRepository::new("app", GitRepositorySpec::default());
        assert!(repo.conditions().is_empty());
        assert!(repo.failed_condition("Ready").is_none());
        assert!(repo.artifact_revision().is_none());
    }

    #[test]
    fn test_ref_serializes_as_ref() {
        let spec = GitRepositorySpec {
            url: "ssh://git@example.com/repo".to_string(),
            reference: Some(GitRepositoryRef {
                branch: Some("main".to_string()),
                ..Default::default()
            }),
            interval: "1m".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["ref"]["branch"], "main");
        assert!(value.get("secretRef").is_none());
    }
}
