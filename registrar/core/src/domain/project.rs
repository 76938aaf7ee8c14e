// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;

use crate::domain::credentials::CredentialError;

/// Looks up project metadata the settings file does not carry
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    /// Resolve the numeric project number for a project id
    async fn project_number(&self, project_id: &str) -> Result<String, ResourceManagerError>;
}

/// Errors from the Resource Manager API (project lookup and IAM policy)
#[derive(Debug, thiserror::Error)]
pub enum ResourceManagerError {
    #[error("Resource Manager API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode Resource Manager response: {0}")]
    Decode(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}
