//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Token issuing statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Token issuing statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenStats {
    /// Number of token pairs issued
    pub tokens_issued: u64,

    /// Number of refresh exchanges performed
    pub refresh_exchanges: u64,

    /// Number of refresh tokens rejected (unknown, consumed, or expired)
    pub refresh_rejections: u64,

    /// Number of refresh tokens revoked
    pub revocations: u64,

    /// Number of failed authentications
    pub failed_authentications: u64,

    /// Number of account lockouts
    pub lockouts: u64,

    /// Last token pair issued
    pub last_issued: Option<DateTime<Utc>>,
}

impl TokenStats {
    /// Create new token statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment issued count
    pub fn increment_tokens_issued(&mut self) {
        self.tokens_issued += 1;
        self.last_issued = Some(Utc::now());
    }

    /// Increment refresh exchange count
    pub fn increment_refresh_exchanges(&mut self) {
        self.refresh_exchanges += 1;
    }

    /// Increment refresh rejection count
    pub fn increment_refresh_rejections(&mut self) {
        self.refresh_rejections += 1;
    }

    /// Increment revocation count
    pub fn increment_revocations(&mut self) {
        self.revocations += 1;
    }

    /// Increment failed authentication count
    pub fn increment_failed_authentications(&mut self) {
        self.failed_authentications += 1;
    }

    /// Increment lockout count
    pub fn increment_lockouts(&mut self) {
        self.lockouts += 1;
    }
}
