//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Permission policy configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Permission policy configuration
///
/// Maps each role to the permissions it grants. Membership is explicit:
/// no role implies another, and a permission absent from every entry is
/// denied for everyone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether policy evaluation is enabled
    pub enabled: bool,

    /// Role name to granted permissions
    pub roles: HashMap<String, Vec<String>>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let mut roles = HashMap::new();

        // The admin grant is spelled out in full rather than implied.
        roles.insert(
            "admin".to_string(),
            vec![
                "members:view".to_string(),
                "members:edit".to_string(),
                "donations:view".to_string(),
                "donations:create".to_string(),
                "donations:approve".to_string(),
                "beneficiaries:view".to_string(),
                "beneficiaries:edit".to_string(),
                "finance:manage".to_string(),
                "profile:view".to_string(),
            ],
        );

        roles.insert(
            "manager".to_string(),
            vec![
                "members:view".to_string(),
                "members:edit".to_string(),
                "donations:view".to_string(),
                "donations:approve".to_string(),
                "beneficiaries:view".to_string(),
                "beneficiaries:edit".to_string(),
                "finance:manage".to_string(),
                "profile:view".to_string(),
            ],
        );

        roles.insert(
            "operator".to_string(),
            vec![
                "donations:view".to_string(),
                "donations:create".to_string(),
                "beneficiaries:view".to_string(),
                "profile:view".to_string(),
            ],
        );

        roles.insert("member".to_string(), vec!["profile:view".to_string()]);

        Self {
            enabled: true,
            roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_config_default() {
        let config = PolicyConfig::default();
        assert!(config.enabled);
        assert!(config.roles.contains_key("admin"));
        assert!(config.roles.contains_key("manager"));
        assert!(config.roles.contains_key("operator"));
        assert!(config.roles.contains_key("member"));
    }

    #[test]
    fn test_member_role_cannot_view_members() {
        let config = PolicyConfig::default();
        let member = config.roles.get("member").unwrap();
        assert!(!member.contains(&"members:view".to_string()));
    }
}
