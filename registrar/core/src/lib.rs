// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent Registrar Core
//!
//! Registers, lists and removes agents in the Gemini Enterprise agent
//! directory, together with the OAuth authorization resource and IAM grants
//! the directory needs before an agent can be served.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, use cases and API adapters shared by the CLI

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
