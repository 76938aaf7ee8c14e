// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Access token providers
//!
//! - [`StaticTokenProvider`]: a token handed in by the operator or a test
//! - [`GcloudTokenProvider`]: asks the local gcloud installation, once per run

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::domain::credentials::{CredentialError, TokenProvider};

#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, CredentialError> {
        if self.token.trim().is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(self.token.clone())
    }
}

/// Runs `gcloud auth print-access-token` on first use and reuses the token
/// for the remainder of the process.
pub struct GcloudTokenProvider {
    program: String,
    cached: OnceCell<String>,
}

impl GcloudTokenProvider {
    pub fn new() -> Self {
        Self::with_program("gcloud")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cached: OnceCell::new(),
        }
    }

    async fn fetch(&self) -> Result<String, CredentialError> {
        tracing::debug!("Requesting access token from {}", self.program);

        let output = Command::new(&self.program)
            .args(["auth", "print-access-token"])
            .output()
            .await
            .map_err(|e| CredentialError::Unavailable(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredentialError::Failed(stderr.trim().to_string()));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }

        Ok(token)
    }
}

impl Default for GcloudTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenProvider for GcloudTokenProvider {
    async fn access_token(&self) -> Result<String, CredentialError> {
        self.cached
            .get_or_try_init(|| self.fetch())
            .await
            .cloned()
    }
}
