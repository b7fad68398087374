//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Session model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tokens::IssuedTokens;

/// Session metadata
///
/// Created on login, expiries renewed by refresh, destroyed on logout or
/// refresh-token expiry. The session never carries token material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub session_id: String,

    /// User ID
    pub user_id: String,

    /// Roles held by the user
    pub roles: Vec<String>,

    /// Session creation time
    pub issued_at: DateTime<Utc>,

    /// Access token expiry
    pub access_expires_at: DateTime<Utc>,

    /// Refresh token expiry
    pub refresh_expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session from freshly issued tokens
    pub fn from_issued(issued: &IssuedTokens) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id: issued.user_id.clone(),
            roles: issued.roles.clone(),
            issued_at: Utc::now(),
            access_expires_at: issued.access_expires_at,
            refresh_expires_at: issued.refresh_expires_at,
        }
    }

    /// Check if the access token has expired
    pub fn is_access_expired(&self) -> bool {
        self.access_expires_at <= Utc::now()
    }

    /// Check if the refresh token has expired
    pub fn is_refresh_expired(&self) -> bool {
        self.refresh_expires_at <= Utc::now()
    }

    /// Check if the user holds a role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
