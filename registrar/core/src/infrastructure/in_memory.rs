// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory implementations of the directory, IAM and project ports.
//!
//! They behave like the real services where the registrar relies on it:
//! agent creation always assigns a fresh resource name, display names are not
//! unique, authorization ids collide, and IAM bindings are additive. Each
//! double counts the calls it receives.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::agent::{AgentDefinition, AgentRecord};
use crate::domain::authorization::AuthorizationResource;
use crate::domain::directory::{AgentDirectory, DirectoryError};
use crate::domain::iam::{BindingOutcome, IamBinding, IamPolicyClient};
use crate::domain::identity::AppIdentity;
use crate::domain::project::{ProjectResolver, ResourceManagerError};

/// Calls received by an [`InMemoryAgentDirectory`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryCalls {
    pub create_authorization: usize,
    pub delete_authorization: usize,
    pub create_agent: usize,
    pub list_agents: usize,
    pub delete_agent: usize,
}

impl DirectoryCalls {
    pub fn total(&self) -> usize {
        self.create_authorization
            + self.delete_authorization
            + self.create_agent
            + self.list_agents
            + self.delete_agent
    }
}

#[derive(Default)]
struct DirectoryState {
    agents: BTreeMap<String, AgentRecord>,
    authorizations: BTreeMap<String, AuthorizationResource>,
    failing_deletes: HashSet<String>,
    calls: DirectoryCalls,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryAgentDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl InMemoryAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, DirectoryState>, DirectoryError> {
        self.state
            .lock()
            .map_err(|_| DirectoryError::Network("Mutex poisoned".to_string()))
    }

    /// Make every delete of `resource_name` fail with HTTP 500
    pub fn fail_delete_of(&self, resource_name: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_deletes.insert(resource_name.into());
        }
    }

    pub fn calls(&self) -> DirectoryCalls {
        self.state.lock().map(|s| s.calls).unwrap_or_default()
    }

    pub fn agents(&self) -> Vec<AgentRecord> {
        self.state
            .lock()
            .map(|s| s.agents.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn authorization(&self, auth_id: &str) -> Option<AuthorizationResource> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.authorizations.get(auth_id).cloned())
    }
}

#[async_trait]
impl AgentDirectory for InMemoryAgentDirectory {
    async fn create_authorization(
        &self,
        identity: &AppIdentity,
        resource: &AuthorizationResource,
    ) -> Result<String, DirectoryError> {
        let mut state = self.lock()?;
        state.calls.create_authorization += 1;

        if state.authorizations.contains_key(&resource.auth_id) {
            return Err(DirectoryError::Api {
                status: 409,
                body: format!(
                    r#"{{"error":{{"code":409,"message":"Authorization {} already exists","status":"ALREADY_EXISTS"}}}}"#,
                    resource.auth_id
                ),
            });
        }

        state
            .authorizations
            .insert(resource.auth_id.clone(), resource.clone());
        Ok(identity.authorization_path(&resource.auth_id))
    }

    async fn delete_authorization(
        &self,
        _identity: &AppIdentity,
        auth_id: &str,
    ) -> Result<(), DirectoryError> {
        let mut state = self.lock()?;
        state.calls.delete_authorization += 1;

        match state.authorizations.remove(auth_id) {
            Some(_) => Ok(()),
            None => Err(DirectoryError::Api {
                status: 404,
                body: format!(r#"{{"error":{{"code":404,"message":"Authorization {} not found"}}}}"#, auth_id),
            }),
        }
    }

    async fn create_agent(
        &self,
        identity: &AppIdentity,
        definition: &AgentDefinition,
    ) -> Result<AgentRecord, DirectoryError> {
        let mut state = self.lock()?;
        state.calls.create_agent += 1;
        state.next_id += 1;

        let record = AgentRecord {
            resource_name: format!("{}/{}", identity.agents_path(), 1_000 + state.next_id),
            display_name: definition.display_name.clone(),
            description: definition.description.clone(),
            tool_description: Some(definition.tool_description.clone()),
            backing_engine: Some(definition.backing_engine.clone()),
            authorization_ref: definition.authorization.clone(),
            create_time: Some(Utc::now()),
        };

        state
            .agents
            .insert(record.resource_name.clone(), record.clone());
        Ok(record)
    }

    async fn list_agents(&self, identity: &AppIdentity) -> Result<Vec<AgentRecord>, DirectoryError> {
        let mut state = self.lock()?;
        state.calls.list_agents += 1;

        Ok(state
            .agents
            .values()
            .filter(|r| identity.owns(&r.resource_name))
            .cloned()
            .collect())
    }

    async fn delete_agent(
        &self,
        _identity: &AppIdentity,
        resource_name: &str,
    ) -> Result<(), DirectoryError> {
        let mut state = self.lock()?;
        state.calls.delete_agent += 1;

        if state.failing_deletes.contains(resource_name) {
            return Err(DirectoryError::Api {
                status: 500,
                body: r#"{"error":{"code":500,"status":"INTERNAL"}}"#.to_string(),
            });
        }

        match state.agents.remove(resource_name) {
            Some(_) => Ok(()),
            None => Err(DirectoryError::Api {
                status: 404,
                body: format!(r#"{{"error":{{"code":404,"message":"{} not found"}}}}"#, resource_name),
            }),
        }
    }
}

/// Project IAM policy held in memory. Records every add-binding call.
#[derive(Clone, Default)]
pub struct InMemoryIamPolicy {
    granted: Arc<Mutex<Vec<IamBinding>>>,
    calls: Arc<Mutex<Vec<(String, IamBinding)>>>,
}

impl InMemoryIamPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every add-binding call received, in order, with its project id
    pub fn calls(&self) -> Vec<(String, IamBinding)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn bindings(&self) -> Vec<IamBinding> {
        self.granted.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl IamPolicyClient for InMemoryIamPolicy {
    async fn add_binding(
        &self,
        project_id: &str,
        binding: &IamBinding,
    ) -> Result<BindingOutcome, ResourceManagerError> {
        let poisoned = || ResourceManagerError::Network("Mutex poisoned".to_string());

        self.calls
            .lock()
            .map_err(|_| poisoned())?
            .push((project_id.to_string(), binding.clone()));

        let mut granted = self.granted.lock().map_err(|_| poisoned())?;
        if granted.contains(binding) {
            return Ok(BindingOutcome::AlreadyPresent);
        }
        granted.push(binding.clone());
        Ok(BindingOutcome::Added)
    }
}

/// Resolves every project to the same number
pub struct FixedProjectResolver {
    project_number: String,
    calls: AtomicUsize,
}

impl FixedProjectResolver {
    pub fn new(project_number: impl Into<String>) -> Self {
        Self {
            project_number: project_number.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectResolver for FixedProjectResolver {
    async fn project_number(&self, _project_id: &str) -> Result<String, ResourceManagerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.project_number.clone())
    }
}
