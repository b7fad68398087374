//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Session configuration

use serde::{Deserialize, Serialize};

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Whether expired access tokens are refreshed silently
    pub enable_refresh: bool,

    /// Bounded wait for a login exchange, in seconds
    pub login_timeout_secs: u64,

    /// Bounded wait for a refresh exchange, in seconds
    pub refresh_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enable_refresh: true,
            login_timeout_secs: 10,
            refresh_timeout_secs: 10,
        }
    }
}
