// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application
//!
//! Use cases of the registrar, one per step of the deployment flow, plus the
//! deployment workflow that sequences them.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrate domain ports; all network effects go through
//!   `AgentDirectory`, `IamPolicyClient` and `ProjectResolver`

pub mod authorization;
pub mod deployment;
pub mod deregistration;
pub mod iam_provisioner;
pub mod identity;
pub mod registration;
