// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Value objects and port traits for the agent directory.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types shared by use cases and adapters; no I/O lives here

pub mod agent;
pub mod authorization;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod iam;
pub mod identity;
pub mod project;
