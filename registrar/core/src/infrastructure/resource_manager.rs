// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Cloud Resource Manager adapter
//!
//! Resolves project numbers and adds IAM bindings with a read-modify-write of
//! the project policy. The policy etag is sent back unchanged so a concurrent
//! writer makes the set call fail instead of being overwritten; that failure
//! is surfaced, not retried.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::domain::credentials::TokenProvider;
use crate::domain::iam::{BindingOutcome, IamBinding, IamPolicyClient};
use crate::domain::project::{ProjectResolver, ResourceManagerError};

/// Highest policy version; required to read conditional bindings intact
const POLICY_VERSION: u32 = 3;

pub struct ResourceManagerClient {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    project_number: String,
}

/// Project IAM policy. Fields the registrar does not touch are carried
/// through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    #[serde(default)]
    bindings: Vec<PolicyBinding>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolicyBinding {
    role: String,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Policy {
    /// Add `binding` to the unconditional binding for its role
    pub(crate) fn add(&mut self, binding: &IamBinding) -> BindingOutcome {
        let existing = self
            .bindings
            .iter_mut()
            .find(|b| b.role == binding.role && b.condition.is_none());

        match existing {
            Some(b) if b.members.iter().any(|m| m == &binding.member) => BindingOutcome::AlreadyPresent,
            Some(b) => {
                b.members.push(binding.member.clone());
                BindingOutcome::Added
            }
            None => {
                self.bindings.push(PolicyBinding {
                    role: binding.role.clone(),
                    members: vec![binding.member.clone()],
                    condition: None,
                    extra: Map::new(),
                });
                BindingOutcome::Added
            }
        }
    }
}

impl ResourceManagerClient {
    pub fn new(endpoint: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Result<Self, ResourceManagerError> {
        let client = Client::builder().build().map_err(|e| {
            ResourceManagerError::Network(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn project_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{}", self.endpoint, project_id)
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ResourceManagerError> {
        let token = self.tokens.access_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ResourceManagerError> {
        let response = request
            .send()
            .await
            .map_err(|e| ResourceManagerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ResourceManagerError::Api { status, body });
        }

        Ok(response)
    }

    async fn get_policy(&self, project_id: &str) -> Result<Policy, ResourceManagerError> {
        let url = format!("{}:getIamPolicy", self.project_url(project_id));
        tracing::debug!("POST {}", url);

        let request = self
            .authorized(self.client.post(&url))
            .await?
            .json(&json!({ "options": { "requestedPolicyVersion": POLICY_VERSION } }));

        Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| ResourceManagerError::Decode(e.to_string()))
    }

    async fn set_policy(&self, project_id: &str, policy: &Policy) -> Result<(), ResourceManagerError> {
        let url = format!("{}:setIamPolicy", self.project_url(project_id));
        tracing::debug!("POST {}", url);

        let request = self
            .authorized(self.client.post(&url))
            .await?
            .json(&json!({ "policy": policy }));

        Self::send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectResolver for ResourceManagerClient {
    async fn project_number(&self, project_id: &str) -> Result<String, ResourceManagerError> {
        let url = self.project_url(project_id);
        tracing::debug!("GET {}", url);

        let request = self.authorized(self.client.get(&url)).await?;
        let project: ProjectResponse = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| ResourceManagerError::Decode(e.to_string()))?;

        Ok(project.project_number)
    }
}

#[async_trait]
impl IamPolicyClient for ResourceManagerClient {
    async fn add_binding(
        &self,
        project_id: &str,
        binding: &IamBinding,
    ) -> Result<BindingOutcome, ResourceManagerError> {
        let mut policy = self.get_policy(project_id).await?;

        let outcome = policy.add(binding);
        if outcome == BindingOutcome::Added {
            self.set_policy(project_id, &policy).await?;
        }

        Ok(outcome)
    }
}
