// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequences provisioning, Flux installation and readiness verification.

pub mod poll;
pub mod scenario;

pub use poll::{poll_until_ready, PollError, PollSchedule};
pub use scenario::{application_scenarios, Scenario};

use crate::bootstrap::BootstrapRegistrar;
use crate::config::Config;
use crate::error::{E2eError, Result};
use crate::install::{AgentInstaller, FluxCli};
use crate::kubernetes::{
    ClusterClient, ClusterCredentials, CredentialResolver, TlsCredentialResolver,
};
use crate::provision::{Provisioner, Terraform};
use crate::verify::verify_git_and_kustomization;
use tracing::{error, info, instrument, warn};

/// Result of polling one scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// Attempts needed on success
    pub outcome: std::result::Result<u32, PollError>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-scenario outcomes of a run whose core install verified
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(ScenarioResult::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}

pub struct E2eDriver {
    config: Config,
    provisioner: Box<dyn Provisioner>,
    resolver: Box<dyn CredentialResolver>,
    installer: Box<dyn AgentInstaller>,
    scenarios: Vec<Scenario>,
}

impl E2eDriver {
    pub fn new(
        config: Config,
        provisioner: Box<dyn Provisioner>,
        resolver: Box<dyn CredentialResolver>,
        installer: Box<dyn AgentInstaller>,
    ) -> Self {
        Self {
            config,
            provisioner,
            resolver,
            installer,
            scenarios: application_scenarios(),
        }
    }

    /// Driver backed by terraform, client certificate auth and the flux CLI
    pub fn from_config(config: Config) -> Self {
        let provisioner =
            Terraform::new(&config.terraform_dir).with_binary(&config.terraform_binary);
        let installer = FluxCli::new(&config.flux_binary).with_timeout(config.install_timeout);
        Self::new(
            config,
            Box::new(provisioner),
            Box::new(TlsCredentialResolver::new()),
            Box::new(installer),
        )
    }

    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Run every stage, then tear down when `destroy_on_exit` is set.
    ///
    /// Fails on the first provisioning, credential, install or bootstrap error and when
    /// the flux-system resources never become ready. Application scenarios are polled
    /// independently and reported in the [`RunReport`].
    pub async fn run(&self) -> Result<RunReport> {
        let result = self.run_stages().await;

        if self.config.destroy_on_exit {
            info!("Running Terraform destroy");
            if let Err(e) = self.provisioner.destroy().await {
                error!("Failed to destroy infrastructure: {}", e);
            }
        } else {
            info!("Leaving infrastructure in place for inspection");
        }

        result
    }

    async fn run_stages(&self) -> Result<RunReport> {
        info!("Running Terraform init and apply");
        self.provisioner.init_and_apply().await?;
        let credentials = ClusterCredentials::from_provisioner(self.provisioner.as_ref()).await?;

        info!("Installing Flux");
        // Dropping `cluster` removes the temporary kubeconfig directory
        let cluster = self.resolver.resolve(&credentials).await?;
        self.installer.install(cluster.kubeconfig.path()).await?;

        if let Some(bootstrap) = &self.config.bootstrap {
            info!("Bootstrapping Flux from {}", bootstrap.url);
            BootstrapRegistrar::new(bootstrap.clone())
                .register(&cluster.client)
                .await?;
        }

        info!("Verifying Flux installation");
        self.verify(&cluster.client, &Scenario::flux_system())
            .await
            .map_err(E2eError::CoreNotReady)?;

        info!("Verifying application-gitops namespaces");
        let mut report = RunReport::default();
        for scenario in &self.scenarios {
            let outcome = self.verify(&cluster.client, scenario).await;
            match &outcome {
                Ok(attempts) => info!("{}: ready after {} attempt(s)", scenario.name, attempts),
                Err(e) => warn!("{}: {}", scenario.name, e),
            }
            report.results.push(ScenarioResult {
                scenario: scenario.clone(),
                outcome,
            });
        }

        Ok(report)
    }

    #[instrument(skip(self, client, scenario), fields(scenario = %scenario.name))]
    async fn verify(
        &self,
        client: &ClusterClient,
        scenario: &Scenario,
    ) -> std::result::Result<u32, PollError> {
        poll_until_ready(self.config.poll, self.config.fail_fast, || {
            verify_git_and_kustomization(client, &scenario.namespace, &scenario.resource_name)
        })
        .await
    }
}
