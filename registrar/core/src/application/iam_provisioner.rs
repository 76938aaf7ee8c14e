// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! IAM Provisioner
//!
//! Grants the fixed roles to the Google-managed service identities that serve
//! the agent. Grants are additive and idempotent, so re-running against a
//! project that already has them is safe; nothing is ever revoked. The first
//! failing grant aborts the run with the API error.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::iam::{required_bindings, BindingOutcome, IamBinding, IamPolicyClient};

#[derive(Debug, Clone, Default)]
pub struct ProvisioningReport {
    pub grants: Vec<(IamBinding, BindingOutcome)>,
}

impl ProvisioningReport {
    pub fn added(&self) -> usize {
        self.grants
            .iter()
            .filter(|(_, outcome)| *outcome == BindingOutcome::Added)
            .count()
    }

    pub fn already_present(&self) -> usize {
        self.grants.len() - self.added()
    }
}

pub struct IamProvisioner {
    iam: Arc<dyn IamPolicyClient>,
}

impl IamProvisioner {
    pub fn new(iam: Arc<dyn IamPolicyClient>) -> Self {
        Self { iam }
    }

    pub async fn provision(&self, project_id: &str, project_number: &str) -> Result<ProvisioningReport> {
        let mut report = ProvisioningReport::default();

        for binding in required_bindings(project_number) {
            info!("Granting {} to {}", binding.role, binding.member);

            let outcome = self
                .iam
                .add_binding(project_id, &binding)
                .await
                .with_context(|| format!("Failed to grant {}", binding))?;

            report.grants.push((binding, outcome));
        }

        info!(
            "IAM provisioning complete: {} added, {} already present",
            report.added(),
            report.already_present()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::iam::{BindingCondition, ServiceIdentity, REQUIRED_ROLES};
    use crate::infrastructure::in_memory::InMemoryIamPolicy;

    #[tokio::test]
    async fn test_six_unconditional_grants() {
        let iam = InMemoryIamPolicy::new();
        let provisioner = IamProvisioner::new(Arc::new(iam.clone()));

        let report = provisioner.provision("acme-prod", "42").await.unwrap();

        let calls = iam.calls();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|(project, _)| project == "acme-prod"));
        assert!(calls.iter().all(|(_, b)| b.condition == BindingCondition::None));

        for identity in ServiceIdentity::ALL {
            let member = identity.member("42");
            for role in REQUIRED_ROLES {
                let count = calls
                    .iter()
                    .filter(|(_, b)| b.member == member && b.role == role)
                    .count();
                assert_eq!(count, 1, "{member} / {role}");
            }
        }
        assert_eq!(report.added(), 6);
    }

    #[tokio::test]
    async fn test_rerun_is_a_no_op() {
        let iam = InMemoryIamPolicy::new();
        let provisioner = IamProvisioner::new(Arc::new(iam.clone()));

        provisioner.provision("acme-prod", "42").await.unwrap();
        let second = provisioner.provision("acme-prod", "42").await.unwrap();

        assert_eq!(second.added(), 0);
        assert_eq!(second.already_present(), 6);
        assert_eq!(iam.bindings().len(), 6);
    }
}
