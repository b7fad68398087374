//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Access token claims definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenConfig;

/// Access token claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Token ID
    pub jti: String,

    /// User roles
    pub roles: Vec<String>,
}

impl AccessClaims {
    /// Create new access claims
    pub fn new(user_id: String, roles: Vec<String>, config: &TokenConfig) -> Self {
        let now = Utc::now();
        let exp = now.timestamp() + config.access_ttl_secs as i64;

        Self {
            sub: user_id,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4().to_string(),
            roles,
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }

    /// Get user ID
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Get roles
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Get expiration time as DateTime
    pub fn expiration_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
