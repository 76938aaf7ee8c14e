// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use tracing::info;

use registrar_core::application::deregistration::AgentDeregistrar;
use registrar_core::application::registration::AgentRegistrar;
use registrar_core::domain::agent::AgentRecord;
use registrar_core::domain::config::RegistrarConfig;
use registrar_core::domain::identity::AppIdentity;

use crate::context::{GlobalArgs, RegistrarContext};

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Register the agent described by the settings file
    Register {
        /// Reasoning engine id or full resource name (overrides AGENT_ENGINE_ID)
        #[arg(long, value_name = "ID")]
        engine: Option<String>,

        /// Attach the authorization AUTH_ID; it must already exist (see `auth create`)
        #[arg(long)]
        with_authorization: bool,
    },

    /// List agents registered under the app
    List {
        /// Only show agents with this exact display name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every agent with the given display name
    Deregister {
        /// Display name to remove (default: AGENT_DISPLAY_NAME)
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },
}

pub async fn handle_command(command: AgentCommand, global: &GlobalArgs) -> Result<()> {
    let ctx = RegistrarContext::load(global)?;

    match command {
        AgentCommand::Register {
            engine,
            with_authorization,
        } => register(ctx, engine, with_authorization).await,
        AgentCommand::List { name, json } => list(ctx, name, json).await,
        AgentCommand::Deregister { name } => deregister(ctx, name).await,
    }
}

async fn register(ctx: RegistrarContext, engine: Option<String>, with_authorization: bool) -> Result<()> {
    let config = ctx.config.clone().with_engine_id(engine)?;
    config.validate_for_deploy()?;
    if with_authorization && config.oauth.is_none() {
        bail!("--with-authorization needs OAUTH_CLIENT_ID, OAUTH_CLIENT_SECRET and AUTH_ID");
    }

    let identity = ctx.identity().await?;
    let authorization = existing_authorization(&config, &identity, with_authorization);
    info!(
        "Registering '{}' {} authorization",
        config.require_display_name()?,
        if authorization.is_some() { "with" } else { "without" }
    );

    let record = AgentRegistrar::new(ctx.directory.clone())
        .register(&config, &identity, authorization)
        .await?;

    println!("{}", format!("✓ Agent registered: {}", record.resource_name).green());
    Ok(())
}

/// Path of an authorization created earlier with `auth create`, only when asked for
fn existing_authorization(
    config: &RegistrarConfig,
    identity: &AppIdentity,
    with_authorization: bool,
) -> Option<String> {
    if !with_authorization {
        return None;
    }
    config
        .oauth
        .as_ref()
        .map(|oauth| identity.authorization_path(&oauth.auth_id))
}

async fn list(ctx: RegistrarContext, name: Option<String>, json: bool) -> Result<()> {
    let identity = ctx.identity().await?;
    let deregistrar = AgentDeregistrar::new(ctx.directory.clone());

    let agents = match &name {
        Some(name) => deregistrar.find_by_display_name(&identity, name).await?,
        None => deregistrar.list(&identity).await?,
    };

    if json {
        let out = serde_json::to_string_pretty(&agents).context("Failed to encode agents")?;
        println!("{}", out);
        return Ok(());
    }

    if agents.is_empty() {
        println!("{}", "No agents found".yellow());
        return Ok(());
    }

    println!("{} agents found:", agents.len());
    println!("{:<22} {:<30} {:<22} {}", "ID", "NAME", "CREATED", "ENGINE");
    for agent in &agents {
        print_row(agent);
    }

    Ok(())
}

fn print_row(agent: &AgentRecord) {
    let created = agent
        .create_time
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let engine = agent
        .backing_engine
        .as_ref()
        .map(|e| e.resource_name().to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{:<22} {:<30} {:<22} {}",
        agent.agent_id(),
        agent.display_name.bold(),
        created,
        engine.dimmed()
    );
}

async fn deregister(ctx: RegistrarContext, name: Option<String>) -> Result<()> {
    let display_name = match name {
        Some(name) => name,
        None => ctx.config.require_display_name()?.to_string(),
    };
    let identity = ctx.identity().await?;
    info!("Deregistering agents named '{}' from app {}", display_name, identity.app_id);

    let report = AgentDeregistrar::new(ctx.directory.clone())
        .deregister(&identity, &display_name)
        .await?;

    if report.matched() == 0 {
        println!("{}", format!("No agents named '{}' found", display_name).yellow());
        return Ok(());
    }

    for resource_name in &report.deleted {
        println!("{}", format!("✓ Deleted {}", resource_name).green());
    }
    for (resource_name, error) in &report.failed {
        println!("{}", format!("✗ Failed to delete {}: {}", resource_name, error).red());
    }

    if !report.is_success() {
        bail!(
            "{} of {} agent(s) named '{}' could not be deleted",
            report.failed.len(),
            report.matched(),
            display_name
        );
    }

    Ok(())
}
