//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Main access control configuration

use serde::{Deserialize, Serialize};

use super::csrf::CsrfConfig;
use super::policy::PolicyConfig;
use super::security::SecurityConfig;
use super::session::SessionConfig;
use super::tokens::TokenConfig;

/// Access control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Token configuration
    pub tokens: TokenConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Permission policy configuration
    pub policy: PolicyConfig,

    /// Anti-forgery token configuration
    pub csrf: CsrfConfig,

    /// Security configuration
    pub security: SecurityConfig,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            session: SessionConfig::default(),
            policy: PolicyConfig::default(),
            csrf: CsrfConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl AccessConfig {
    /// Validate the access control configuration
    pub fn validate(&self) -> crate::AccessResult<()> {
        if self.tokens.secret.is_empty() {
            return Err(crate::AccessError::internal(
                "token secret cannot be empty".to_string(),
            ));
        }

        if self.tokens.access_ttl_secs == 0 || self.tokens.refresh_ttl_secs == 0 {
            return Err(crate::AccessError::internal(
                "token lifetimes must be nonzero".to_string(),
            ));
        }

        if self.tokens.access_ttl_secs >= self.tokens.refresh_ttl_secs {
            return Err(crate::AccessError::internal(
                "access token lifetime must be shorter than refresh token lifetime".to_string(),
            ));
        }

        if self.policy.enabled && self.policy.roles.is_empty() {
            return Err(crate::AccessError::internal(
                "policy is enabled but no roles are configured".to_string(),
            ));
        }

        Ok(())
    }

    /// Create configuration from environment variables
    ///
    /// Reads configuration values from `DERNEK_`-prefixed environment
    /// variables, falling back to defaults for everything except the token
    /// secret, which is required.
    ///
    /// # Environment Variables
    ///
    /// - `DERNEK_TOKEN_SECRET`: access token signing secret (required)
    /// - `DERNEK_ACCESS_TTL_SECS`: access token lifetime (default: 900)
    /// - `DERNEK_REFRESH_TTL_SECS`: refresh token lifetime (default: 604800)
    /// - `DERNEK_TOKEN_ISSUER`: token issuer (default: "dernek-backend")
    /// - `DERNEK_TOKEN_AUDIENCE`: token audience (default: "dernek-panel")
    /// - `DERNEK_SESSION_ENABLE_REFRESH`: silent refresh (default: true)
    /// - `DERNEK_LOGIN_TIMEOUT_SECS`: login exchange bound (default: 10)
    /// - `DERNEK_REFRESH_TIMEOUT_SECS`: refresh exchange bound (default: 10)
    /// - `DERNEK_CSRF_HEADER`: anti-forgery header name (default: "x-csrf-token")
    /// - `DERNEK_ENABLE_RATE_LIMITING`: login rate limiting (default: true)
    /// - `DERNEK_RATE_LIMIT_PER_MINUTE`: attempts per minute (default: 10)
    /// - `DERNEK_MAX_FAILED_LOGINS`: attempts before lockout (default: 5)
    /// - `DERNEK_LOCKOUT_DURATION_SECS`: lockout duration (default: 900)
    pub fn from_env() -> crate::AccessResult<Self> {
        let mut config = Self::default();

        if let Ok(secret) = std::env::var("DERNEK_TOKEN_SECRET") {
            config.tokens.secret = secret;
        } else {
            return Err(crate::AccessError::internal(
                "DERNEK_TOKEN_SECRET environment variable is required".to_string(),
            ));
        }

        if let Ok(ttl) = std::env::var("DERNEK_ACCESS_TTL_SECS") {
            config.tokens.access_ttl_secs = ttl.parse().map_err(|_| {
                crate::AccessError::internal(
                    "DERNEK_ACCESS_TTL_SECS must be a valid number".to_string(),
                )
            })?;
        }

        if let Ok(ttl) = std::env::var("DERNEK_REFRESH_TTL_SECS") {
            config.tokens.refresh_ttl_secs = ttl.parse().map_err(|_| {
                crate::AccessError::internal(
                    "DERNEK_REFRESH_TTL_SECS must be a valid number".to_string(),
                )
            })?;
        }

        if let Ok(issuer) = std::env::var("DERNEK_TOKEN_ISSUER") {
            config.tokens.issuer = issuer;
        }

        if let Ok(audience) = std::env::var("DERNEK_TOKEN_AUDIENCE") {
            config.tokens.audience = audience;
        }

        if let Ok(enable) = std::env::var("DERNEK_SESSION_ENABLE_REFRESH") {
            config.session.enable_refresh = enable.parse().unwrap_or(true);
        }

        if let Ok(timeout) = std::env::var("DERNEK_LOGIN_TIMEOUT_SECS") {
            config.session.login_timeout_secs = timeout.parse().unwrap_or(10);
        }

        if let Ok(timeout) = std::env::var("DERNEK_REFRESH_TIMEOUT_SECS") {
            config.session.refresh_timeout_secs = timeout.parse().unwrap_or(10);
        }

        if let Ok(header) = std::env::var("DERNEK_CSRF_HEADER") {
            config.csrf.header_name = header;
        }

        if let Ok(enable) = std::env::var("DERNEK_ENABLE_RATE_LIMITING") {
            config.security.enable_rate_limiting = enable.parse().unwrap_or(true);
        }

        if let Ok(limit) = std::env::var("DERNEK_RATE_LIMIT_PER_MINUTE") {
            config.security.rate_limit_per_minute = limit.parse().unwrap_or(10);
        }

        if let Ok(max) = std::env::var("DERNEK_MAX_FAILED_LOGINS") {
            config.security.max_failed_logins = max.parse().unwrap_or(5);
        }

        if let Ok(duration) = std::env::var("DERNEK_LOCKOUT_DURATION_SECS") {
            config.security.lockout_duration_secs = duration.parse().unwrap_or(900);
        }

        config.validate()?;

        Ok(config)
    }
}
