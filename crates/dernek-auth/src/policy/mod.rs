//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Permission policy evaluation

pub mod engine;
pub mod model;
pub mod stats;

pub use engine::{Decision, PolicyEngine};
pub use model::PermissionTable;
pub use stats::PolicyStats;
