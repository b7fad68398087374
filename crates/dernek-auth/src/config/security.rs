//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Security configuration

use serde::{Deserialize, Serialize};

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Whether to rate limit login attempts
    pub enable_rate_limiting: bool,

    /// Login attempts allowed per identity per minute
    pub rate_limit_per_minute: usize,

    /// Failed login attempts before an account locks
    pub max_failed_logins: u32,

    /// Account lockout duration in seconds
    pub lockout_duration_secs: u64,

    /// Security headers attached to responses
    pub security_headers: SecurityHeaders,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_rate_limiting: true,
            rate_limit_per_minute: 10,
            max_failed_logins: 5,
            lockout_duration_secs: crate::DEFAULT_LOCKOUT_DURATION_SECS,
            security_headers: SecurityHeaders::default(),
        }
    }
}

/// Security headers configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityHeaders {
    /// Whether to send X-Content-Type-Options: nosniff
    pub enable_content_type_options: bool,

    /// Whether to send X-Frame-Options: DENY
    pub enable_frame_options: bool,

    /// Whether to send X-XSS-Protection
    pub enable_xss_protection: bool,

    /// Whether to send Referrer-Policy
    pub enable_referrer_policy: bool,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            enable_content_type_options: true,
            enable_frame_options: true,
            enable_xss_protection: true,
            enable_referrer_policy: true,
        }
    }
}
