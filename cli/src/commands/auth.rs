// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use tracing::info;

use registrar_core::application::authorization::AuthorizationRegistrar;
use registrar_core::domain::config::keys;

use crate::context::{GlobalArgs, RegistrarContext};

#[derive(Subcommand)]
pub enum AuthCommand {
    /// Create the OAuth authorization resource from the settings file
    Create,

    /// Delete an authorization resource
    Delete {
        /// Authorization id (default: AUTH_ID)
        #[arg(long, value_name = "ID")]
        auth_id: Option<String>,
    },
}

pub async fn handle_command(command: AuthCommand, global: &GlobalArgs) -> Result<()> {
    let ctx = RegistrarContext::load(global)?;

    match command {
        AuthCommand::Create => {
            if ctx.config.oauth.is_none() {
                bail!("OAUTH_CLIENT_ID and OAUTH_CLIENT_SECRET must both be set to create an authorization");
            }
            let identity = ctx.identity().await?;

            let registrar = AuthorizationRegistrar::new(ctx.directory.clone());
            if let Some(path) = registrar.register(&ctx.config, &identity).await? {
                println!("{}", format!("✓ Authorization created: {}", path).green());
            }
        }
        AuthCommand::Delete { auth_id } => {
            let auth_id = match auth_id.or_else(|| ctx.settings.get(keys::AUTH_ID).map(str::to_string)) {
                Some(id) => id,
                None => bail!("No authorization id given; pass --auth-id or set AUTH_ID"),
            };
            let identity = ctx.identity().await?;
            info!("Removing authorization {} from {}", auth_id, identity.location_path());

            AuthorizationRegistrar::new(ctx.directory.clone())
                .remove(&identity, &auth_id)
                .await?;
            println!("{}", format!("✓ Authorization {} deleted", auth_id).green());
        }
    }

    Ok(())
}
