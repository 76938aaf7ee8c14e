// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};

use crate::domain::config::RegistrarConfig;
use crate::domain::identity::AppIdentity;
use crate::domain::project::ProjectResolver;

/// Project number from the config, or from the Resource Manager when the
/// settings file does not carry one
pub async fn resolve_project_number(
    config: &RegistrarConfig,
    resolver: &dyn ProjectResolver,
) -> Result<String> {
    if let Some(number) = &config.project_number {
        return Ok(number.clone());
    }

    tracing::info!("Resolving project number for {}", config.project_id);
    resolver
        .project_number(&config.project_id)
        .await
        .with_context(|| format!("Failed to resolve project number for {}", config.project_id))
}

/// Resolve the app identity. Requires the app id to be configured.
pub async fn resolve_identity(
    config: &RegistrarConfig,
    resolver: &dyn ProjectResolver,
) -> Result<AppIdentity> {
    let app_id = config.require_app_id()?.to_string();
    let project_number = resolve_project_number(config, resolver).await?;

    Ok(AppIdentity::new(
        config.project_id.clone(),
        project_number,
        config.directory_location.clone(),
        app_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{keys, Settings};
    use crate::infrastructure::in_memory::FixedProjectResolver;

    fn config(pairs: Vec<(&str, &str)>) -> RegistrarConfig {
        RegistrarConfig::from_settings(&Settings::from_pairs(pairs)).unwrap()
    }

    #[tokio::test]
    async fn test_configured_number_skips_lookup() {
        let resolver = FixedProjectResolver::new("999");
        let config = config(vec![
            (keys::PROJECT_ID, "acme-prod"),
            (keys::PROJECT_NUMBER, "123"),
            (keys::APP_ID, "support-app"),
        ]);

        let identity = resolve_identity(&config, &resolver).await.unwrap();
        assert_eq!(identity.project_number, "123");
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_number_is_looked_up_when_absent() {
        let resolver = FixedProjectResolver::new("999");
        let config = config(vec![(keys::PROJECT_ID, "acme-prod"), (keys::APP_ID, "support-app")]);

        let identity = resolve_identity(&config, &resolver).await.unwrap();
        assert_eq!(identity.project_number, "999");
        assert_eq!(identity.location, "global");
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_app_id_fails_before_lookup() {
        let resolver = FixedProjectResolver::new("999");
        let config = config(vec![(keys::PROJECT_ID, "acme-prod")]);

        assert!(resolve_identity(&config, &resolver).await.is_err());
        assert_eq!(resolver.calls(), 0);
    }
}
