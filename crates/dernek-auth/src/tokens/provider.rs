//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Identity provider trait and in-memory implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{SecurityConfig, TokenConfig};

use super::claims::AccessClaims;
use super::stats::TokenStats;

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,

    /// Password
    pub password: String,
}

/// Token pair returned by a successful exchange
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    /// User ID
    pub user_id: String,

    /// Roles granted to the user
    pub roles: Vec<String>,

    /// Bearer access token
    pub access_token: String,

    /// Refresh token, single use
    pub refresh_token: String,

    /// Access token expiry
    pub access_expires_at: DateTime<Utc>,

    /// Refresh token expiry
    pub refresh_expires_at: DateTime<Utc>,
}

/// Identity provider
///
/// The backend that verifies credentials and mints token pairs. The session
/// manager is the only caller of `exchange_refresh` and `revoke`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify credentials and issue a fresh token pair
    async fn authenticate(&self, credentials: &Credentials) -> crate::AccessResult<IssuedTokens>;

    /// Exchange a refresh token for a new token pair
    ///
    /// Refresh tokens are single use: a successful exchange invalidates the
    /// presented token.
    async fn exchange_refresh(&self, refresh_token: &str) -> crate::AccessResult<IssuedTokens>;

    /// Revoke a refresh token
    ///
    /// Revoking an unknown token is a no-op.
    async fn revoke(&self, refresh_token: &str) -> crate::AccessResult<()>;
}

/// Stored user record
#[derive(Debug, Clone)]
struct UserRecord {
    user_id: String,
    salt: String,
    password_digest: Vec<u8>,
    roles: Vec<String>,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

/// Stored refresh token record
#[derive(Debug, Clone)]
struct RefreshRecord {
    user_id: String,
    roles: Vec<String>,
    expires_at: DateTime<Utc>,
}

/// In-memory identity provider
///
/// Backing store for deployments without an external directory (in
/// production this would be a database). Verifies salted credential
/// digests, locks accounts after repeated failures, and hands out single
/// use refresh tokens.
pub struct MemoryIdentityProvider {
    /// Token configuration
    config: TokenConfig,

    /// Security configuration
    security: SecurityConfig,

    /// Access token encoding key
    encoding_key: EncodingKey,

    /// Users keyed by username
    users: Arc<RwLock<HashMap<String, UserRecord>>>,

    /// Live refresh tokens
    refresh_tokens: Arc<RwLock<HashMap<String, RefreshRecord>>>,

    /// Statistics
    stats: Arc<RwLock<TokenStats>>,
}

impl MemoryIdentityProvider {
    /// Create new in-memory identity provider
    pub fn new(config: TokenConfig, security: SecurityConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            security,
            encoding_key,
            users: Arc::new(RwLock::new(HashMap::new())),
            refresh_tokens: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(TokenStats::default())),
        }
    }

    /// Register a user
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        roles: Vec<String>,
    ) -> crate::AccessResult<String> {
        if username.is_empty() || password.is_empty() {
            return Err(crate::AccessError::internal(
                "username and password cannot be empty".to_string(),
            ));
        }

        let salt = generate_opaque_token(16);
        let record = UserRecord {
            user_id: uuid::Uuid::new_v4().to_string(),
            password_digest: digest_password(&salt, password),
            salt,
            roles,
            failed_attempts: 0,
            locked_until: None,
        };
        let user_id = record.user_id.clone();

        {
            let mut users = self.users.write().await;
            if users.contains_key(username) {
                return Err(crate::AccessError::internal(
                    "username already registered".to_string(),
                ));
            }
            users.insert(username.to_string(), record);
        }

        info!("Registered user {}", username);
        Ok(user_id)
    }

    /// Issue a token pair for a verified user
    async fn issue_tokens(
        &self,
        user_id: String,
        roles: Vec<String>,
    ) -> crate::AccessResult<IssuedTokens> {
        let now = Utc::now();
        let claims = AccessClaims::new(user_id.clone(), roles.clone(), &self.config);
        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| crate::AccessError::internal(e.to_string()))?;

        let refresh_token = generate_opaque_token(self.config.opaque_token_bytes);
        let refresh_expires_at =
            now + chrono::Duration::seconds(self.config.refresh_ttl_secs as i64);

        {
            let mut refresh_tokens = self.refresh_tokens.write().await;
            refresh_tokens.insert(
                refresh_token.clone(),
                RefreshRecord {
                    user_id: user_id.clone(),
                    roles: roles.clone(),
                    expires_at: refresh_expires_at,
                },
            );
        }

        {
            let mut stats = self.stats.write().await;
            stats.increment_tokens_issued();
        }

        Ok(IssuedTokens {
            user_id,
            roles,
            access_token,
            refresh_token,
            access_expires_at: claims.expiration_time(),
            refresh_expires_at,
        })
    }

    /// Get token statistics
    pub async fn stats(&self) -> TokenStats {
        let stats = self.stats.read().await;
        stats.clone()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn authenticate(&self, credentials: &Credentials) -> crate::AccessResult<IssuedTokens> {
        let now = Utc::now();

        let (user_id, roles) = {
            let mut users = self.users.write().await;
            let record = users.get_mut(&credentials.username).ok_or_else(|| {
                debug!("Unknown username {}", credentials.username);
                crate::AccessError::InvalidCredentials
            })?;

            if let Some(locked_until) = record.locked_until {
                if now < locked_until {
                    warn!("Login attempt for locked account {}", credentials.username);
                    return Err(crate::AccessError::AccountLocked);
                }
                // Lockout elapsed, the account is usable again
                record.locked_until = None;
                record.failed_attempts = 0;
            }

            let supplied = digest_password(&record.salt, &credentials.password);
            if supplied.ct_eq(&record.password_digest).unwrap_u8() != 1 {
                record.failed_attempts += 1;
                if record.failed_attempts >= self.security.max_failed_logins {
                    record.locked_until = Some(
                        now + chrono::Duration::seconds(
                            self.security.lockout_duration_secs as i64,
                        ),
                    );
                    let mut stats = self.stats.write().await;
                    stats.increment_lockouts();
                    warn!(
                        "Account {} locked after {} failed attempts",
                        credentials.username, record.failed_attempts
                    );
                    return Err(crate::AccessError::AccountLocked);
                }

                let mut stats = self.stats.write().await;
                stats.increment_failed_authentications();
                return Err(crate::AccessError::InvalidCredentials);
            }

            record.failed_attempts = 0;
            (record.user_id.clone(), record.roles.clone())
        };

        info!("Authenticated user {}", credentials.username);
        self.issue_tokens(user_id, roles).await
    }

    async fn exchange_refresh(&self, refresh_token: &str) -> crate::AccessResult<IssuedTokens> {
        // Single use: the presented token is consumed whether or not it is
        // still within its lifetime.
        let record = {
            let mut refresh_tokens = self.refresh_tokens.write().await;
            refresh_tokens.remove(refresh_token)
        };

        let record = match record {
            Some(record) => record,
            None => {
                let mut stats = self.stats.write().await;
                stats.increment_refresh_rejections();
                return Err(crate::AccessError::SessionExpired);
            }
        };

        if record.expires_at < Utc::now() {
            let mut stats = self.stats.write().await;
            stats.increment_refresh_rejections();
            return Err(crate::AccessError::SessionExpired);
        }

        {
            let mut stats = self.stats.write().await;
            stats.increment_refresh_exchanges();
        }

        debug!("Exchanged refresh token for user {}", record.user_id);
        self.issue_tokens(record.user_id, record.roles).await
    }

    async fn revoke(&self, refresh_token: &str) -> crate::AccessResult<()> {
        let removed = {
            let mut refresh_tokens = self.refresh_tokens.write().await;
            refresh_tokens.remove(refresh_token).is_some()
        };

        if removed {
            let mut stats = self.stats.write().await;
            stats.increment_revocations();
        }

        Ok(())
    }
}

impl std::fmt::Debug for MemoryIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdentityProvider")
            .field("config", &"<sensitive>")
            .field("encoding_key", &"<sensitive>")
            .field("users", &"<sensitive>")
            .field("refresh_tokens", &"<sensitive>")
            .field("stats", &self.stats)
            .finish()
    }
}

/// Generate URL-safe opaque token material
pub(crate) fn generate_opaque_token(bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    let material: Vec<u8> = (0..bytes).map(|_| rng.gen()).collect();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(material)
}

fn digest_password(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}
