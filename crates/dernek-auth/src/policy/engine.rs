//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Policy evaluation engine

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::config::PolicyConfig;

use super::model::PermissionTable;
use super::stats::PolicyStats;

/// Policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The role set satisfies the required permission
    Allow,

    /// The role set does not satisfy the required permission
    Deny,
}

/// Policy evaluation engine
///
/// Evaluation is pure and synchronous against an immutable table snapshot.
/// A reload builds a new table and swaps the reference; evaluations that
/// already cloned the snapshot keep seeing a consistent table. When no
/// table is loaded the engine fails closed.
pub struct PolicyEngine {
    /// Current table snapshot; `None` until a table loads successfully
    table: RwLock<Option<Arc<PermissionTable>>>,

    /// Statistics
    stats: RwLock<PolicyStats>,
}

impl PolicyEngine {
    /// Create an engine with no table loaded
    ///
    /// Every evaluation returns `PolicyUnavailable` until `reload` succeeds.
    pub fn unloaded() -> Self {
        Self {
            table: RwLock::new(None),
            stats: RwLock::new(PolicyStats::default()),
        }
    }

    /// Create an engine from policy configuration
    pub fn new(config: &PolicyConfig) -> crate::AccessResult<Self> {
        if !config.enabled || config.roles.is_empty() {
            warn!("Policy table missing or disabled, engine will deny all requests");
            return Ok(Self::unloaded());
        }

        let engine = Self::unloaded();
        engine.reload(PermissionTable::from_config(config));
        Ok(engine)
    }

    /// Replace the table snapshot
    pub fn reload(&self, table: PermissionTable) {
        let role_count = table.role_count();
        let snapshot = Some(Arc::new(table));
        match self.table.write() {
            Ok(mut current) => *current = snapshot,
            // A poisoned lock still holds the slot; recover and swap
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }

        if let Ok(mut stats) = self.stats.write() {
            stats.increment_reloads();
        }

        info!("Loaded permission table with {} roles", role_count);
    }

    /// Current table snapshot, if loaded
    ///
    /// A poisoned lock reads as no table, which fails closed downstream.
    pub fn snapshot(&self) -> Option<Arc<PermissionTable>> {
        self.table.read().ok().and_then(|table| (*table).clone())
    }

    /// Evaluate a role set against a required permission
    ///
    /// Deny-by-default: the permission must be reachable through the role
    /// set explicitly. Fails with `PolicyUnavailable` when no table is
    /// loaded; callers must treat that as a denial, never as a pass.
    pub fn evaluate(&self, roles: &[String], permission: &str) -> crate::AccessResult<Decision> {
        let table = self
            .snapshot()
            .ok_or(crate::AccessError::PolicyUnavailable)?;

        let decision = if table.grants(roles, permission) {
            Decision::Allow
        } else {
            Decision::Deny
        };

        if let Ok(mut stats) = self.stats.write() {
            stats.record_evaluation(decision == Decision::Allow);
        }

        debug!(
            "Policy decision for permission {}: {:?} (roles: {:?})",
            permission, decision, roles
        );
        Ok(decision)
    }

    /// Get policy statistics
    pub fn stats(&self) -> PolicyStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine")
            .field("loaded", &self.snapshot().is_some())
            .finish()
    }
}
