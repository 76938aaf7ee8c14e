// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Agent Registrar CLI
//!
//! The `registrar` binary registers an agent backed by a Vertex AI reasoning
//! engine with a Gemini Enterprise app, and removes it again.
//!
//! ## Commands
//!
//! - `registrar deploy` - IAM grants, authorization and agent in one run
//! - `registrar agent register|list|deregister` - Agent operations
//! - `registrar iam grant|show` - Service identity role grants
//! - `registrar auth create|delete` - OAuth authorization resource
//! - `registrar config show|validate|generate` - Settings file management
//!
//! Every command reads the deployment settings file (`.env` by default).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use agent_registrar::commands::{self, AgentCommand, AuthCommand, ConfigCommand, IamCommand};
use agent_registrar::context::GlobalArgs;

/// Agent Registrar - Manage agents in the Gemini Enterprise directory
#[derive(Parser)]
#[command(name = "registrar")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the deployment settings file
    #[arg(
        short,
        long,
        global = true,
        env = "REGISTRAR_SETTINGS",
        default_value = ".env",
        value_name = "FILE"
    )]
    settings: PathBuf,

    /// Bearer token for Google APIs (default: gcloud auth print-access-token)
    #[arg(long, global = true, env = "REGISTRAR_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "REGISTRAR_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Grant IAM roles, create the authorization and register the agent
    #[command(name = "deploy")]
    Deploy {
        #[command(flatten)]
        args: commands::DeployArgs,
    },

    /// Agent management
    #[command(name = "agent")]
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// IAM grants for service identities
    #[command(name = "iam")]
    Iam {
        #[command(subcommand)]
        command: IamCommand,
    },

    /// OAuth authorization resource management
    #[command(name = "auth")]
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Settings file management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let global = GlobalArgs {
        settings: cli.settings,
        access_token: cli.access_token,
    };

    match cli.command {
        Some(Commands::Deploy { args }) => commands::deploy::handle_command(args, &global).await,
        Some(Commands::Agent { command }) => commands::agent::handle_command(command, &global).await,
        Some(Commands::Iam { command }) => commands::iam::handle_command(command, &global).await,
        Some(Commands::Auth { command }) => commands::auth::handle_command(command, &global).await,
        Some(Commands::Config { command }) => commands::config::handle_command(command, &global).await,
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
