//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Token configuration

use serde::{Deserialize, Serialize};

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Signing secret for access tokens
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds (must exceed the access lifetime)
    pub refresh_ttl_secs: u64,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: String,

    /// Byte length of opaque token material (refresh tokens)
    pub opaque_token_bytes: usize,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "change-this-secret-in-production".to_string(),
            access_ttl_secs: crate::DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_ttl_secs: crate::DEFAULT_REFRESH_TOKEN_TTL_SECS,
            issuer: "dernek-backend".to_string(),
            audience: "dernek-panel".to_string(),
            opaque_token_bytes: 32,
        }
    }
}
