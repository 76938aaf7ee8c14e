// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use tracing::info;

use registrar_core::application::iam_provisioner::IamProvisioner;
use registrar_core::application::identity::resolve_project_number;
use registrar_core::domain::iam::{required_bindings, BindingOutcome};

use crate::context::{GlobalArgs, RegistrarContext};

#[derive(Subcommand)]
pub enum IamCommand {
    /// Grant the required roles to the Google-managed service identities
    Grant,

    /// Print the bindings `grant` would add, without calling the IAM API
    Show,
}

pub async fn handle_command(command: IamCommand, global: &GlobalArgs) -> Result<()> {
    let ctx = RegistrarContext::load(global)?;
    let project_number = resolve_project_number(&ctx.config, ctx.projects.as_ref()).await?;
    info!("Project {} has number {}", ctx.config.project_id, project_number);

    match command {
        IamCommand::Grant => {
            println!("Granting roles in project {}", ctx.config.project_id.bold());

            let report = IamProvisioner::new(ctx.iam.clone())
                .provision(&ctx.config.project_id, &project_number)
                .await?;

            for (binding, outcome) in &report.grants {
                match outcome {
                    BindingOutcome::Added => println!("  {} {}", "+".green(), binding),
                    BindingOutcome::AlreadyPresent => println!("  {} {}", "=".dimmed(), binding),
                }
            }
            println!(
                "{}",
                format!(
                    "✓ {} added, {} already present",
                    report.added(),
                    report.already_present()
                )
                .green()
            );
        }
        IamCommand::Show => {
            for binding in required_bindings(&project_number) {
                println!("{}", binding);
            }
        }
    }

    Ok(())
}
