// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent Directory
//!
//! Port for the Gemini Enterprise agent directory. The directory is the sole
//! source of truth for which agents exist; nothing is cached locally.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Directory contract implemented by the Discovery Engine
//!   client and the in-memory directory

use async_trait::async_trait;

use crate::domain::agent::{AgentDefinition, AgentRecord};
use crate::domain::authorization::AuthorizationResource;
use crate::domain::credentials::CredentialError;
use crate::domain::identity::AppIdentity;

/// Domain interface for the agent directory
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Create an OAuth2 authorization resource, returning its resource path.
    /// Fails with the raw API error if `auth_id` already exists.
    async fn create_authorization(
        &self,
        identity: &AppIdentity,
        resource: &AuthorizationResource,
    ) -> Result<String, DirectoryError>;

    /// Delete an authorization resource by id
    async fn delete_authorization(
        &self,
        identity: &AppIdentity,
        auth_id: &str,
    ) -> Result<(), DirectoryError>;

    /// Create a new agent. Never updates an existing one.
    async fn create_agent(
        &self,
        identity: &AppIdentity,
        definition: &AgentDefinition,
    ) -> Result<AgentRecord, DirectoryError>;

    /// List every agent under the app, across all pages
    async fn list_agents(&self, identity: &AppIdentity) -> Result<Vec<AgentRecord>, DirectoryError>;

    /// Delete one agent by its server-assigned resource name
    async fn delete_agent(
        &self,
        identity: &AppIdentity,
        resource_name: &str,
    ) -> Result<(), DirectoryError>;
}

/// Errors returned by directory operations.
///
/// Conflicts and rate limiting are not singled out; `Api` carries the raw
/// response body for the operator to inspect.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Directory API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode directory response: {0}")]
    Decode(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl DirectoryError {
    /// The resource did not exist (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::Api { status: 404, .. })
    }
}
