// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the registrar CLI

pub mod agent;
pub mod auth;
pub mod config;
pub mod deploy;
pub mod iam;

pub use self::agent::AgentCommand;
pub use self::auth::AuthCommand;
pub use self::config::ConfigCommand;
pub use self::deploy::DeployArgs;
pub use self::iam::IamCommand;
