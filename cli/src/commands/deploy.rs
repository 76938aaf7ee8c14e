// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `registrar deploy`: IAM grants, authorization and agent in one run

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::info;

use registrar_core::application::deployment::{DeployOptions, DeploymentOutcome, DeploymentWorkflow};
use registrar_core::domain::iam::BindingOutcome;

use crate::context::{GlobalArgs, RegistrarContext};

#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Do not touch the project IAM policy
    #[arg(long)]
    pub skip_iam: bool,

    /// Deregister agents with the same display name first
    #[arg(long)]
    pub replace: bool,

    /// Reasoning engine id or full resource name (overrides AGENT_ENGINE_ID)
    #[arg(long, value_name = "ID")]
    pub engine: Option<String>,
}

impl From<DeployArgs> for DeployOptions {
    fn from(args: DeployArgs) -> Self {
        DeployOptions {
            skip_iam: args.skip_iam,
            replace: args.replace,
            engine_id: args.engine,
        }
    }
}

pub async fn handle_command(args: DeployArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RegistrarContext::load(global)?;
    let options = DeployOptions::from(args);
    let config = ctx.config.clone().with_engine_id(options.engine_id.clone())?;

    println!(
        "Deploying {} to app {}",
        config.agent.display_name.as_deref().unwrap_or("<unnamed>").bold(),
        config.app_id.as_deref().unwrap_or("<unset>").bold()
    );

    info!(
        "Deploy options: skip_iam={} replace={}",
        options.skip_iam, options.replace
    );
    let workflow = DeploymentWorkflow::new(ctx.directory.clone(), ctx.iam.clone(), ctx.projects.clone());
    let outcome = workflow.run(&config, &options).await?;

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &DeploymentOutcome) {
    match &outcome.iam {
        Some(report) => {
            for (binding, result) in &report.grants {
                let mark = match result {
                    BindingOutcome::Added => "+".green(),
                    BindingOutcome::AlreadyPresent => "=".dimmed(),
                };
                println!("  {} {}", mark, binding);
            }
            println!(
                "{}",
                format!(
                    "✓ IAM: {} added, {} already present",
                    report.added(),
                    report.already_present()
                )
                .green()
            );
        }
        None => println!("{}", "⚠ IAM provisioning skipped".yellow()),
    }

    if let Some(replaced) = &outcome.replaced {
        println!(
            "{}",
            format!("✓ Removed {} existing agent(s)", replaced.deleted.len()).green()
        );
    }

    match &outcome.authorization {
        Some(path) => println!("{}", format!("✓ Authorization created: {}", path).green()),
        None => println!("{}", "⚠ No OAuth client configured; authorization skipped".yellow()),
    }

    println!(
        "{}",
        format!("✓ Agent registered: {}", outcome.agent.resource_name).green()
    );
}
