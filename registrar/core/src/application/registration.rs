// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent Registrar
//!
//! Creates the agent in the app's agent collection. This is a create, not an
//! upsert: running it twice leaves two agents with the same display name.
//! Cleaning those up is the deregistrar's job.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::agent::{AgentDefinition, AgentRecord};
use crate::domain::config::RegistrarConfig;
use crate::domain::directory::AgentDirectory;
use crate::domain::identity::{AppIdentity, BackingEngine};

pub struct AgentRegistrar {
    directory: Arc<dyn AgentDirectory>,
}

impl AgentRegistrar {
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    /// Build the create payload from configuration
    pub fn definition(
        config: &RegistrarConfig,
        identity: &AppIdentity,
        authorization: Option<String>,
    ) -> Result<AgentDefinition> {
        let display_name = config.require_display_name()?;
        let engine = BackingEngine::resolve(
            &identity.project_number,
            &config.region,
            config.require_engine_id()?,
        );

        Ok(AgentDefinition::from_profile(
            display_name,
            &config.agent,
            engine,
            authorization,
        ))
    }

    pub async fn register(
        &self,
        config: &RegistrarConfig,
        identity: &AppIdentity,
        authorization: Option<String>,
    ) -> Result<AgentRecord> {
        let definition = Self::definition(config, identity, authorization)?;

        info!(
            "Registering agent '{}' backed by {}",
            definition.display_name, definition.backing_engine
        );

        let record = self
            .directory
            .create_agent(identity, &definition)
            .await
            .with_context(|| format!("Failed to register agent '{}'", definition.display_name))?;

        info!("Agent registered: {}", record.resource_name);
        Ok(record)
    }
}
