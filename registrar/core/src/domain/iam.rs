// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! IAM Bindings
//!
//! The Google-managed service identities that serve an agent need to call the
//! model and read staged artifacts. Their emails are derived from the project
//! number, so the full set of grants is known before any API call.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Service identities, roles and the IAM policy port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::project::ResourceManagerError;

pub const ROLE_AI_PLATFORM_USER: &str = "roles/aiplatform.user";
pub const ROLE_STORAGE_OBJECT_VIEWER: &str = "roles/storage.objectViewer";

/// Roles granted to every service identity, in grant order
pub const REQUIRED_ROLES: [&str; 2] = [ROLE_AI_PLATFORM_USER, ROLE_STORAGE_OBJECT_VIEWER];

/// Google-managed service agents involved in serving a registered agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceIdentity {
    /// Gemini Enterprise / Discovery Engine
    DiscoveryEngine,
    /// Vertex AI Agent Engine (reasoning engines)
    ReasoningEngine,
    /// Vertex AI platform
    AiPlatform,
}

impl ServiceIdentity {
    pub const ALL: [ServiceIdentity; 3] = [
        ServiceIdentity::DiscoveryEngine,
        ServiceIdentity::ReasoningEngine,
        ServiceIdentity::AiPlatform,
    ];

    fn domain_suffix(&self) -> &'static str {
        match self {
            ServiceIdentity::DiscoveryEngine => "gcp-sa-discoveryengine",
            ServiceIdentity::ReasoningEngine => "gcp-sa-aiplatform-re",
            ServiceIdentity::AiPlatform => "gcp-sa-aiplatform",
        }
    }

    pub fn email(&self, project_number: &str) -> String {
        format!(
            "service-{}@{}.iam.gserviceaccount.com",
            project_number,
            self.domain_suffix()
        )
    }

    /// IAM member string, e.g. `serviceAccount:service-1@...`
    pub fn member(&self, project_number: &str) -> String {
        format!("serviceAccount:{}", self.email(project_number))
    }
}

/// Condition attached to a binding. The registrar only grants unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindingCondition {
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamBinding {
    pub member: String,
    pub role: String,
    pub condition: BindingCondition,
}

impl IamBinding {
    pub fn unconditional(member: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            role: role.into(),
            condition: BindingCondition::None,
        }
    }
}

impl fmt::Display for IamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.member, self.role)
    }
}

/// Every binding the registrar grants for a project, identity by identity
pub fn required_bindings(project_number: &str) -> Vec<IamBinding> {
    ServiceIdentity::ALL
        .into_iter()
        .flat_map(|identity| {
            let member = identity.member(project_number);
            REQUIRED_ROLES
                .into_iter()
                .map(move |role| IamBinding::unconditional(member.clone(), role))
        })
        .collect()
}

/// Result of an add-binding call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOutcome {
    Added,
    AlreadyPresent,
}

/// Additive, idempotent access to a project's IAM policy
#[async_trait]
pub trait IamPolicyClient: Send + Sync {
    /// Add one binding. Adding a binding the project already has succeeds
    /// with `AlreadyPresent`. Bindings are never removed.
    async fn add_binding(
        &self,
        project_id: &str,
        binding: &IamBinding,
    ) -> Result<BindingOutcome, ResourceManagerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_identity_emails() {
        assert_eq!(
            ServiceIdentity::DiscoveryEngine.email("42"),
            "service-42@gcp-sa-discoveryengine.iam.gserviceaccount.com"
        );
        assert_eq!(
            ServiceIdentity::ReasoningEngine.member("42"),
            "serviceAccount:service-42@gcp-sa-aiplatform-re.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn test_required_bindings_cover_every_identity_and_role() {
        let bindings = required_bindings("42");
        assert_eq!(bindings.len(), 6);
        assert!(bindings.iter().all(|b| b.condition == BindingCondition::None));

        for identity in ServiceIdentity::ALL {
            let member = identity.member("42");
            let roles: Vec<_> = bindings
                .iter()
                .filter(|b| b.member == member)
                .map(|b| b.role.as_str())
                .collect();
            assert_eq!(roles, REQUIRED_ROLES.to_vec());
        }
    }
}
