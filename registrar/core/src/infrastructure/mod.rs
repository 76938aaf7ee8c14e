// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Adapters for the settings file, Google credentials, the Discovery Engine
//! directory API and the Resource Manager API, plus in-memory doubles.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Anti-corruption layer between domain ports and Google APIs

pub mod credentials;
pub mod discovery_engine;
pub mod in_memory;
pub mod resource_manager;
pub mod settings_file;
