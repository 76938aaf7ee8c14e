// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Credential Provider Domain Interface
//
// Every Google API call carries a bearer access token. Where the token comes
// from (a gcloud login, a token passed on the command line, a test double)
// is decided by the caller; adapters only ask for one.
//
// Implementations in infrastructure/credentials.rs.

use async_trait::async_trait;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a bearer access token valid for the Google Cloud APIs
    async fn access_token(&self) -> Result<String, CredentialError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential helper unavailable: {0}")]
    Unavailable(String),

    #[error("Credential helper failed: {0}")]
    Failed(String),

    #[error("Credential helper returned an empty token")]
    Empty,
}
