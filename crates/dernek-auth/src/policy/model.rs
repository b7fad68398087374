//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Permission table definitions

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;

/// Immutable role-to-permission snapshot
///
/// Built once from configuration and never mutated; a policy reload
/// constructs a fresh table and swaps the reference. Grants are explicit:
/// no role implies another, and permission strings are matched verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionTable {
    /// Role name to granted permissions
    grants: HashMap<String, HashSet<String>>,
}

impl PermissionTable {
    /// Build a table from policy configuration
    pub fn from_config(config: &PolicyConfig) -> Self {
        let grants = config
            .roles
            .iter()
            .map(|(role, permissions)| (role.clone(), permissions.iter().cloned().collect()))
            .collect();

        Self { grants }
    }

    /// Check whether a role grants a permission
    pub fn role_grants(&self, role: &str, permission: &str) -> bool {
        self.grants
            .get(role)
            .map(|permissions| permissions.contains(permission))
            .unwrap_or(false)
    }

    /// Check whether any role in the set grants a permission
    pub fn grants(&self, roles: &[String], permission: &str) -> bool {
        roles.iter().any(|role| self.role_grants(role, permission))
    }

    /// Union of permissions reachable through a role set
    pub fn reachable_permissions(&self, roles: &[String]) -> HashSet<String> {
        let mut reachable = HashSet::new();
        for role in roles {
            if let Some(permissions) = self.grants.get(role) {
                reachable.extend(permissions.iter().cloned());
            }
        }
        reachable
    }

    /// Number of configured roles
    pub fn role_count(&self) -> usize {
        self.grants.len()
    }
}
