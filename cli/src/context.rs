// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wiring from CLI arguments to configured API clients.
//!
//! The settings file is loaded and validated before any client exists, so a
//! configuration error can never be preceded by a network call.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use registrar_core::application::identity::resolve_identity;
use registrar_core::domain::config::{RegistrarConfig, Settings};
use registrar_core::domain::credentials::TokenProvider;
use registrar_core::domain::directory::AgentDirectory;
use registrar_core::domain::iam::IamPolicyClient;
use registrar_core::domain::identity::AppIdentity;
use registrar_core::domain::project::ProjectResolver;
use registrar_core::infrastructure::credentials::{GcloudTokenProvider, StaticTokenProvider};
use registrar_core::infrastructure::discovery_engine::DiscoveryEngineClient;
use registrar_core::infrastructure::resource_manager::ResourceManagerClient;
use registrar_core::infrastructure::settings_file::load_settings;

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub settings: PathBuf,
    pub access_token: Option<String>,
}

/// Loads settings and validates them into a config, without building clients
pub fn load_config(args: &GlobalArgs) -> Result<(Settings, RegistrarConfig)> {
    let settings = load_settings(&args.settings)?;
    let config = RegistrarConfig::from_settings(&settings)
        .with_context(|| format!("Invalid settings in {}", args.settings.display()))?;
    Ok((settings, config))
}

pub struct RegistrarContext {
    pub settings: Settings,
    pub config: RegistrarConfig,
    pub directory: Arc<dyn AgentDirectory>,
    pub iam: Arc<dyn IamPolicyClient>,
    pub projects: Arc<dyn ProjectResolver>,
}

impl RegistrarContext {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let (settings, config) = load_config(args)?;

        let tokens: Arc<dyn TokenProvider> = match &args.access_token {
            Some(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            None => Arc::new(GcloudTokenProvider::new()),
        };

        let directory = DiscoveryEngineClient::new(config.endpoints.discovery_engine.clone(), tokens.clone())?;
        let resource_manager = Arc::new(ResourceManagerClient::new(
            config.endpoints.resource_manager.clone(),
            tokens,
        )?);

        Ok(Self {
            settings,
            config,
            directory: Arc::new(directory),
            iam: resource_manager.clone(),
            projects: resource_manager,
        })
    }

    pub async fn identity(&self) -> Result<AppIdentity> {
        resolve_identity(&self.config, self.projects.as_ref()).await
    }
}
