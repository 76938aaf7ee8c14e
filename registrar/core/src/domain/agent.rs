// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::config::AgentProfile;
use crate::domain::identity::BackingEngine;

/// What gets sent to the directory when an agent is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    pub display_name: String,
    pub description: String,
    pub icon_uri: String,
    pub tool_description: String,
    pub backing_engine: BackingEngine,
    /// Authorization resource path; omitted from the payload when `None`
    pub authorization: Option<String>,
}

impl AgentDefinition {
    pub fn from_profile(
        display_name: &str,
        profile: &AgentProfile,
        backing_engine: BackingEngine,
        authorization: Option<String>,
    ) -> Self {
        Self {
            display_name: display_name.to_string(),
            description: profile.description.clone(),
            icon_uri: profile.icon_uri.clone(),
            tool_description: profile.tool_description.clone(),
            backing_engine,
            authorization,
        }
    }
}

/// An agent as stored in the directory.
///
/// `resource_name` is server-assigned and unique; `display_name` is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub resource_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backing_engine: Option<BackingEngine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

impl AgentRecord {
    /// Trailing segment of the resource name
    pub fn agent_id(&self) -> &str {
        self.resource_name
            .rsplit('/')
            .next()
            .unwrap_or(&self.resource_name)
    }

    pub fn matches_display_name(&self, display_name: &str) -> bool {
        self.display_name == display_name
    }
}
