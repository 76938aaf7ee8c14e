// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use registrar_core::application::deployment::{DeployOptions, DeploymentWorkflow};
use registrar_core::application::deregistration::AgentDeregistrar;
use registrar_core::domain::config::{keys, ConfigError, Settings};
use registrar_core::domain::iam::BindingCondition;
use registrar_core::infrastructure::in_memory::{
    FixedProjectResolver, InMemoryAgentDirectory, InMemoryIamPolicy,
};
use std::sync::Arc;

struct Harness {
    directory: InMemoryAgentDirectory,
    iam: InMemoryIamPolicy,
    projects: Arc<FixedProjectResolver>,
    workflow: DeploymentWorkflow,
}

fn harness() -> Harness {
    let directory = InMemoryAgentDirectory::new();
    let iam = InMemoryIamPolicy::new();
    let projects = Arc::new(FixedProjectResolver::new("123456789"));
    let workflow = DeploymentWorkflow::new(
        Arc::new(directory.clone()),
        Arc::new(iam.clone()),
        projects.clone(),
    );

    Harness {
        directory,
        iam,
        projects,
        workflow,
    }
}

fn settings(extra: &[(&str, &str)]) -> Settings {
    let mut pairs = vec![
        (keys::PROJECT_ID, "acme-prod"),
        (keys::APP_ID, "support-app"),
        (keys::DISPLAY_NAME, "Brand Aligner"),
        (keys::DESCRIPTION, "Checks assets against brand guidelines"),
        (keys::ENGINE_ID, "4242"),
    ];
    pairs.extend_from_slice(extra);
    Settings::from_pairs(pairs)
}

fn oauth_settings() -> Settings {
    settings(&[
        (keys::OAUTH_CLIENT_ID, "client-123"),
        (keys::OAUTH_CLIENT_SECRET, "s3cret"),
        (keys::AUTH_ID, "brand-auth"),
    ])
}

#[tokio::test]
async fn missing_project_id_aborts_before_any_call() {
    let h = harness();
    let settings = Settings::from_pairs(vec![
        (keys::APP_ID, "support-app"),
        (keys::DISPLAY_NAME, "Brand Aligner"),
        (keys::ENGINE_ID, "4242"),
    ]);

    let err = h
        .workflow
        .run_from_settings(&settings, &DeployOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Missing(keys::PROJECT_ID))
    ));
    assert_eq!(h.directory.calls().total(), 0);
    assert!(h.iam.calls().is_empty());
    assert_eq!(h.projects.calls(), 0);
}

#[tokio::test]
async fn missing_engine_aborts_before_any_call() {
    let h = harness();
    let settings = Settings::from_pairs(vec![
        (keys::PROJECT_ID, "acme-prod"),
        (keys::APP_ID, "support-app"),
        (keys::DISPLAY_NAME, "Brand Aligner"),
    ]);

    assert!(h
        .workflow
        .run_from_settings(&settings, &DeployOptions::default())
        .await
        .is_err());
    assert_eq!(h.directory.calls().total(), 0);
    assert!(h.iam.calls().is_empty());
    assert_eq!(h.projects.calls(), 0);
}

#[tokio::test]
async fn full_deploy_with_oauth_references_authorization() {
    let h = harness();

    let outcome = h
        .workflow
        .run_from_settings(&oauth_settings(), &DeployOptions::default())
        .await
        .unwrap();

    let expected = "projects/123456789/locations/global/authorizations/brand-auth";
    assert_eq!(outcome.authorization.as_deref(), Some(expected));
    assert_eq!(outcome.agent.authorization_ref.as_deref(), Some(expected));
    assert_eq!(outcome.iam.as_ref().map(|r| r.grants.len()), Some(6));

    let calls = h.iam.calls();
    assert_eq!(calls.len(), 6);
    assert!(calls.iter().all(|(_, b)| b.condition == BindingCondition::None));
}

#[tokio::test]
async fn deploy_without_oauth_omits_authorization() {
    let h = harness();

    let outcome = h
        .workflow
        .run_from_settings(&settings(&[]), &DeployOptions::default())
        .await
        .unwrap();

    assert!(outcome.authorization.is_none());
    assert!(outcome.agent.authorization_ref.is_none());
    assert_eq!(h.directory.calls().create_authorization, 0);
}

#[tokio::test]
async fn registering_twice_creates_duplicates() {
    let h = harness();
    let options = DeployOptions {
        skip_iam: true,
        ..Default::default()
    };

    let first = h.workflow.run_from_settings(&settings(&[]), &options).await.unwrap();
    let second = h.workflow.run_from_settings(&settings(&[]), &options).await.unwrap();

    assert_ne!(first.agent.resource_name, second.agent.resource_name);

    let named: Vec<_> = h
        .directory
        .agents()
        .into_iter()
        .filter(|r| r.display_name == "Brand Aligner")
        .collect();
    assert_eq!(named.len(), 2);
    assert!(h.iam.calls().is_empty());
}

#[tokio::test]
async fn deregistration_removes_all_duplicates() {
    let h = harness();
    let options = DeployOptions {
        skip_iam: true,
        ..Default::default()
    };
    let mut identity = None;
    for _ in 0..2 {
        identity = Some(h.workflow.run_from_settings(&settings(&[]), &options).await.unwrap().identity);
    }
    let identity = identity.unwrap();

    let deregistrar = AgentDeregistrar::new(Arc::new(h.directory.clone()));
    let report = deregistrar.deregister(&identity, "Brand Aligner").await.unwrap();

    assert_eq!(report.deleted.len(), 2);
    assert_eq!(h.directory.calls().delete_agent, 2);
    assert!(h.directory.agents().is_empty());

    // Second run finds nothing and still succeeds
    let again = deregistrar.deregister(&identity, "Brand Aligner").await.unwrap();
    assert!(again.is_success());
    assert_eq!(again.matched(), 0);
    assert_eq!(h.directory.calls().delete_agent, 2);
}

#[tokio::test]
async fn replace_leaves_a_single_agent() {
    let h = harness();
    let plain = DeployOptions {
        skip_iam: true,
        ..Default::default()
    };
    h.workflow.run_from_settings(&settings(&[]), &plain).await.unwrap();
    h.workflow.run_from_settings(&settings(&[]), &plain).await.unwrap();

    let replace = DeployOptions {
        skip_iam: true,
        replace: true,
        ..Default::default()
    };
    let outcome = h.workflow.run_from_settings(&settings(&[]), &replace).await.unwrap();

    assert_eq!(outcome.replaced.map(|r| r.deleted.len()), Some(2));
    let agents = h.directory.agents();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].resource_name, outcome.agent.resource_name);
}

#[tokio::test]
async fn second_oauth_deploy_fails_on_authorization_collision() {
    let h = harness();
    let options = DeployOptions {
        skip_iam: true,
        ..Default::default()
    };

    h.workflow.run_from_settings(&oauth_settings(), &options).await.unwrap();
    let err = h
        .workflow
        .run_from_settings(&oauth_settings(), &options)
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("ALREADY_EXISTS"));
    // The agent create is never attempted after the conflict
    assert_eq!(h.directory.calls().create_agent, 1);
}

#[tokio::test]
async fn engine_override_wins_over_settings() {
    let h = harness();
    let options = DeployOptions {
        skip_iam: true,
        engine_id: Some("projects/123456789/locations/europe-west4/reasoningEngines/9".into()),
        ..Default::default()
    };

    let outcome = h.workflow.run_from_settings(&settings(&[]), &options).await.unwrap();
    assert_eq!(
        outcome.agent.backing_engine.unwrap().resource_name(),
        "projects/123456789/locations/europe-west4/reasoningEngines/9"
    );
}
