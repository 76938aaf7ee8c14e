// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent Lister & Deregistrar
//!
//! Display names are not unique in the directory, so deregistration deletes
//! every agent whose display name matches exactly. Deletes are independent:
//! a failure is recorded and the remaining matches are still attempted. No
//! match at all is a successful no-op.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::agent::AgentRecord;
use crate::domain::directory::{AgentDirectory, DirectoryError};
use crate::domain::identity::AppIdentity;

/// Per-agent results of a deregistration run
#[derive(Debug, Default)]
pub struct DeregistrationReport {
    pub display_name: String,
    pub deleted: Vec<String>,
    pub failed: Vec<(String, DirectoryError)>,
}

impl DeregistrationReport {
    pub fn matched(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct AgentDeregistrar {
    directory: Arc<dyn AgentDirectory>,
}

impl AgentDeregistrar {
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    pub async fn list(&self, identity: &AppIdentity) -> Result<Vec<AgentRecord>> {
        self.directory
            .list_agents(identity)
            .await
            .context("Failed to list agents")
    }

    /// Every agent whose display name is exactly `display_name`
    pub async fn find_by_display_name(
        &self,
        identity: &AppIdentity,
        display_name: &str,
    ) -> Result<Vec<AgentRecord>> {
        let matches: Vec<_> = self
            .list(identity)
            .await?
            .into_iter()
            .filter(|r| r.matches_display_name(display_name))
            .collect();

        info!("Found {} agent(s) named '{}'", matches.len(), display_name);
        Ok(matches)
    }

    pub async fn deregister(
        &self,
        identity: &AppIdentity,
        display_name: &str,
    ) -> Result<DeregistrationReport> {
        let matches = self.find_by_display_name(identity, display_name).await?;

        let mut report = DeregistrationReport {
            display_name: display_name.to_string(),
            ..Default::default()
        };

        for record in matches {
            match self.directory.delete_agent(identity, &record.resource_name).await {
                Ok(()) => {
                    info!("Deleted {}", record.resource_name);
                    report.deleted.push(record.resource_name);
                }
                // Already removed by someone else
                Err(e) if e.is_not_found() => {
                    info!("{} was already gone", record.resource_name);
                    report.deleted.push(record.resource_name);
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", record.resource_name, e);
                    report.failed.push((record.resource_name, e));
                }
            }
        }

        Ok(report)
    }
}
