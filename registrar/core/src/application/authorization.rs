// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Authorization Registrar
//!
//! Creates the OAuth2 authorization resource when an OAuth client is
//! configured. Without one the step is skipped and the agent is registered
//! without delegated user authorization. An existing `auth_id` is not
//! reused: the directory's conflict error is returned as-is.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::authorization::AuthorizationResource;
use crate::domain::config::RegistrarConfig;
use crate::domain::directory::AgentDirectory;
use crate::domain::identity::AppIdentity;

pub struct AuthorizationRegistrar {
    directory: Arc<dyn AgentDirectory>,
}

impl AuthorizationRegistrar {
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the authorization resource path, or `None` when skipped
    pub async fn register(
        &self,
        config: &RegistrarConfig,
        identity: &AppIdentity,
    ) -> Result<Option<String>> {
        let Some(oauth) = &config.oauth else {
            warn!("No OAuth client configured; skipping authorization resource");
            return Ok(None);
        };

        let resource = AuthorizationResource::from_oauth(oauth)?;
        info!("Creating authorization {}", resource.auth_id);

        let path = self
            .directory
            .create_authorization(identity, &resource)
            .await
            .with_context(|| format!("Failed to create authorization {}", resource.auth_id))?;

        info!("Authorization created: {}", path);
        Ok(Some(path))
    }

    pub async fn remove(&self, identity: &AppIdentity, auth_id: &str) -> Result<()> {
        info!("Deleting authorization {}", auth_id);
        self.directory
            .delete_authorization(identity, auth_id)
            .await
            .with_context(|| format!("Failed to delete authorization {}", auth_id))
    }
}
