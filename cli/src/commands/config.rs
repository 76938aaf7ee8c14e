// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Settings file commands
//!
//! Commands: show, validate, generate. None of them call a Google API.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use registrar_core::domain::authorization::AuthorizationResource;
use registrar_core::domain::config::RegistrarConfig;

use crate::context::{load_config, GlobalArgs};

pub const SETTINGS_TEMPLATE: &str = include_str!("../../templates/settings.env");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Check that the settings are complete for `deploy`
    Validate,

    /// Write a commented settings template
    Generate {
        /// Output path
        #[arg(short, long, default_value = ".env")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, global: &GlobalArgs) -> Result<()> {
    match command {
        ConfigCommand::Show => show(global),
        ConfigCommand::Validate => validate(global),
        ConfigCommand::Generate { output, force } => generate(output, force),
    }
}

fn show(global: &GlobalArgs) -> Result<()> {
    let (settings, config) = load_config(global)?;

    println!(
        "{} {} ({} keys)",
        "Settings file:".bold(),
        global.settings.display(),
        settings.len()
    );
    println!();
    print_config(&config);

    Ok(())
}

fn print_config(config: &RegistrarConfig) {
    let unset = || "(not set)".dimmed().to_string();

    println!("{}", "Project:".bold());
    println!("  ID: {}", config.project_id);
    println!(
        "  Number: {}",
        config.project_number.clone().unwrap_or_else(|| "(resolved at run time)".dimmed().to_string())
    );
    println!("  Region: {}", config.region);
    if let Some(bucket) = &config.bucket {
        println!("  Bucket: {}", bucket);
    }
    if let Some(model) = &config.model {
        println!("  Model: {}", model);
    }
    println!();

    println!("{}", "Gemini Enterprise:".bold());
    println!("  Location: {}", config.directory_location);
    println!("  App: {}", config.app_id.clone().unwrap_or_else(unset));
    println!("  Endpoint: {}", config.endpoints.discovery_engine);
    println!();

    println!("{}", "Agent:".bold());
    println!(
        "  Display name: {}",
        config.agent.display_name.clone().unwrap_or_else(unset)
    );
    println!("  Description: {}", config.agent.description);
    println!("  Tool description: {}", config.agent.tool_description);
    println!("  Icon: {}", config.agent.icon_uri);
    println!("  Engine: {}", config.engine_id.clone().unwrap_or_else(unset));
    println!();

    println!("{}", "OAuth:".bold());
    match &config.oauth {
        Some(oauth) => {
            println!("  Authorization id: {}", oauth.auth_id);
            println!("  Client id: {}", oauth.client_id);
            println!("  Client secret: {}", "********".dimmed());
            println!("  Token URI: {}", oauth.token_uri);
        }
        None => println!("  {}", "(not configured)".dimmed()),
    }
}

fn validate(global: &GlobalArgs) -> Result<()> {
    println!("Validating {}...", global.settings.display());

    let (_, config) = load_config(global)?;
    config
        .validate_for_deploy()
        .context("Settings are incomplete for deploy")?;
    if let Some(oauth) = &config.oauth {
        AuthorizationResource::from_oauth(oauth).context("Invalid OAuth settings")?;
    } else {
        println!("{}", "⚠ No OAuth client configured; agents will have no authorization".yellow());
    }

    println!("{}", "✓ Settings are valid".green());
    Ok(())
}

fn generate(output: PathBuf, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", output.display());
    }

    std::fs::write(&output, SETTINGS_TEMPLATE)
        .with_context(|| format!("Failed to write settings to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Settings template generated: {}", output.display()).green()
    );

    Ok(())
}
