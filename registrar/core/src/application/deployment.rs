// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Workflow
//!
//! Application service that runs the full registration flow against the
//! directory.
//!
//! # Flow
//!
//! 1. Build and validate the configuration (no network access yet)
//! 2. Resolve the app identity (project number lookup if needed)
//! 3. Grant IAM roles to the service identities, unless skipped
//! 4. Optionally remove agents that already use the display name
//! 5. Create the authorization resource when an OAuth client is configured
//! 6. Create the agent
//!
//! # Error Handling
//!
//! Configuration errors surface before any call is issued. Every later step
//! stops the run on its first API error; nothing already created is rolled
//! back.

use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::authorization::AuthorizationRegistrar;
use crate::application::deregistration::{AgentDeregistrar, DeregistrationReport};
use crate::application::iam_provisioner::{IamProvisioner, ProvisioningReport};
use crate::application::identity::resolve_identity;
use crate::application::registration::AgentRegistrar;
use crate::domain::agent::AgentRecord;
use crate::domain::authorization::AuthorizationResource;
use crate::domain::config::{RegistrarConfig, Settings};
use crate::domain::directory::AgentDirectory;
use crate::domain::iam::IamPolicyClient;
use crate::domain::identity::AppIdentity;
use crate::domain::project::ProjectResolver;

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Leave the project IAM policy alone
    pub skip_iam: bool,
    /// Deregister agents with the same display name before creating
    pub replace: bool,
    /// Backing engine override; takes precedence over the settings file
    pub engine_id: Option<String>,
}

#[derive(Debug)]
pub struct DeploymentOutcome {
    pub identity: AppIdentity,
    pub iam: Option<ProvisioningReport>,
    pub replaced: Option<DeregistrationReport>,
    pub authorization: Option<String>,
    pub agent: AgentRecord,
}

pub struct DeploymentWorkflow {
    directory: Arc<dyn AgentDirectory>,
    iam: Arc<dyn IamPolicyClient>,
    projects: Arc<dyn ProjectResolver>,
}

impl DeploymentWorkflow {
    pub fn new(
        directory: Arc<dyn AgentDirectory>,
        iam: Arc<dyn IamPolicyClient>,
        projects: Arc<dyn ProjectResolver>,
    ) -> Self {
        Self {
            directory,
            iam,
            projects,
        }
    }

    pub async fn run_from_settings(
        &self,
        settings: &Settings,
        options: &DeployOptions,
    ) -> Result<DeploymentOutcome> {
        let config = RegistrarConfig::from_settings(settings)?.with_engine_id(options.engine_id.clone())?;
        self.run(&config, options).await
    }

    pub async fn run(&self, config: &RegistrarConfig, options: &DeployOptions) -> Result<DeploymentOutcome> {
        config.validate_for_deploy()?;
        if let Some(oauth) = &config.oauth {
            AuthorizationResource::from_oauth(oauth)?;
        }

        let identity = resolve_identity(config, self.projects.as_ref()).await?;
        info!(
            "Deploying to app {} (project {} / {})",
            identity.app_id, identity.project_id, identity.project_number
        );

        let iam = if options.skip_iam {
            warn!("Skipping IAM provisioning");
            None
        } else {
            let provisioner = IamProvisioner::new(self.iam.clone());
            Some(
                provisioner
                    .provision(&identity.project_id, &identity.project_number)
                    .await?,
            )
        };

        let replaced = if options.replace {
            let display_name = config.require_display_name()?;
            let report = AgentDeregistrar::new(self.directory.clone())
                .deregister(&identity, display_name)
                .await?;
            if !report.is_success() {
                bail!(
                    "Failed to remove {} existing agent(s) named '{}'",
                    report.failed.len(),
                    display_name
                );
            }
            Some(report)
        } else {
            None
        };

        let authorization = AuthorizationRegistrar::new(self.directory.clone())
            .register(config, &identity)
            .await?;

        let agent = AgentRegistrar::new(self.directory.clone())
            .register(config, &identity, authorization.clone())
            .await?;

        Ok(DeploymentOutcome {
            identity,
            iam,
            replaced,
            authorization,
            agent,
        })
    }
}
