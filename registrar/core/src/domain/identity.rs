// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! App Identity
//!
//! Identifies the Gemini Enterprise app (the tenant directory instance) and
//! derives every resource path the registrar addresses.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Resource naming for the directory and backing engines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection and assistant scope every agent lives under
pub const DEFAULT_COLLECTION: &str = "default_collection";
pub const DEFAULT_ASSISTANT: &str = "default_assistant";

/// Identity of the tenant directory instance. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    pub project_id: String,
    pub project_number: String,
    pub location: String,
    pub app_id: String,
}

impl AppIdentity {
    pub fn new(
        project_id: impl Into<String>,
        project_number: impl Into<String>,
        location: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            project_number: project_number.into(),
            location: location.into(),
            app_id: app_id.into(),
        }
    }

    /// `projects/{number}/locations/{location}`
    pub fn location_path(&self) -> String {
        format!(
            "projects/{}/locations/{}",
            self.project_number, self.location
        )
    }

    /// Assistant that owns the agent collection
    pub fn assistant_path(&self) -> String {
        format!(
            "{}/collections/{}/engines/{}/assistants/{}",
            self.location_path(),
            DEFAULT_COLLECTION,
            self.app_id,
            DEFAULT_ASSISTANT
        )
    }

    pub fn agents_path(&self) -> String {
        format!("{}/agents", self.assistant_path())
    }

    pub fn authorizations_path(&self) -> String {
        format!("{}/authorizations", self.location_path())
    }

    pub fn authorization_path(&self, auth_id: &str) -> String {
        format!("{}/{}", self.authorizations_path(), auth_id)
    }

    /// True when `resource_name` is an agent under this app
    pub fn owns(&self, resource_name: &str) -> bool {
        resource_name
            .strip_prefix(&self.agents_path())
            .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
    }
}

/// The provisioned reasoning engine an agent delegates execution to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackingEngine {
    resource_name: String,
}

impl BackingEngine {
    /// Accepts either a bare engine id, which is expanded under the project
    /// number and region, or an already qualified `projects/...` path.
    pub fn resolve(project_number: &str, region: &str, engine_id: &str) -> Self {
        let resource_name = if engine_id.starts_with("projects/") {
            engine_id.to_string()
        } else {
            format!(
                "projects/{}/locations/{}/reasoningEngines/{}",
                project_number, region, engine_id
            )
        };
        Self { resource_name }
    }

    pub fn from_resource_name(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }
}

impl fmt::Display for BackingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> AppIdentity {
        AppIdentity::new("acme-prod", "123456789", "global", "support-app")
    }

    #[test]
    fn test_paths() {
        let id = identity();
        assert_eq!(
            id.agents_path(),
            "projects/123456789/locations/global/collections/default_collection/engines/support-app/assistants/default_assistant/agents"
        );
        assert_eq!(
            id.authorization_path("brand-auth"),
            "projects/123456789/locations/global/authorizations/brand-auth"
        );
    }

    #[test]
    fn test_owns() {
        let id = identity();
        let name = format!("{}/987", id.agents_path());
        assert!(id.owns(&name));
        assert!(!id.owns(&id.agents_path()));
        assert!(!id.owns("projects/1/locations/global/collections/default_collection/engines/x/assistants/default_assistant/agents/1"));
    }

    #[test]
    fn test_backing_engine_expansion() {
        let engine = BackingEngine::resolve("123456789", "us-central1", "4242");
        assert_eq!(
            engine.resource_name(),
            "projects/123456789/locations/us-central1/reasoningEngines/4242"
        );

        let qualified = "projects/other/locations/europe-west1/reasoningEngines/77";
        assert_eq!(
            BackingEngine::resolve("123456789", "us-central1", qualified).resource_name(),
            qualified
        );
    }
}
