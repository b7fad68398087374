//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Anti-forgery token issuing and validation

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::CsrfConfig;
use crate::session::Session;
use crate::tokens::provider::generate_opaque_token;

/// Anti-forgery token bound to a session
#[derive(Debug, Clone)]
pub struct CsrfToken {
    /// Session the token is bound to
    pub session_id: String,

    /// Token value for embedding in a form field or request header
    pub value: String,

    /// Issue time
    pub issued_at: DateTime<Utc>,
}

/// Anti-forgery guard
///
/// One live token per session, replaced on every issue and on every
/// successful validation of a state-mutating request, so a captured value
/// stops working after its first legitimate use. Comparison is constant
/// time; unknown or destroyed sessions always fail.
pub struct CsrfGuard {
    /// Anti-forgery configuration
    config: CsrfConfig,

    /// Live token values keyed by session ID
    tokens: Arc<RwLock<HashMap<String, String>>>,

    /// Statistics
    stats: Arc<RwLock<CsrfStats>>,
}

impl CsrfGuard {
    /// Create new anti-forgery guard
    pub fn new(config: CsrfConfig) -> Self {
        Self {
            config,
            tokens: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CsrfStats::default())),
        }
    }

    /// Request header carrying the submitted token
    pub fn header_name(&self) -> &str {
        &self.config.header_name
    }

    /// Issue a token for a session
    ///
    /// Replaces any previous value for the same session.
    pub async fn issue(&self, session: &Session) -> CsrfToken {
        let value = generate_opaque_token(self.config.token_bytes);

        {
            let mut tokens = self.tokens.write().await;
            tokens.insert(session.session_id.clone(), value.clone());
        }

        {
            let mut stats = self.stats.write().await;
            stats.increment_issued();
        }

        debug!("Issued anti-forgery token for session {}", session.session_id);
        CsrfToken {
            session_id: session.session_id.clone(),
            value,
            issued_at: Utc::now(),
        }
    }

    /// Validate a submitted token and rotate on success
    ///
    /// The stored value is compared in constant time. On success the old
    /// value is invalidated and the replacement returned for the next
    /// mutating request.
    pub async fn validate_and_rotate(
        &self,
        session: &Session,
        supplied: &str,
    ) -> crate::AccessResult<CsrfToken> {
        let stored = {
            let tokens = self.tokens.read().await;
            tokens.get(&session.session_id).cloned()
        };

        let stored = match stored {
            Some(stored) => stored,
            None => {
                warn!(
                    "Anti-forgery validation for session {} with no live token",
                    session.session_id
                );
                let mut stats = self.stats.write().await;
                stats.increment_rejected();
                return Err(crate::AccessError::CsrfMismatch);
            }
        };

        if stored.as_bytes().ct_eq(supplied.as_bytes()).unwrap_u8() != 1 {
            warn!(
                "Anti-forgery token mismatch for session {}",
                session.session_id
            );
            let mut stats = self.stats.write().await;
            stats.increment_rejected();
            return Err(crate::AccessError::CsrfMismatch);
        }

        let rotated = self.issue(session).await;

        {
            let mut stats = self.stats.write().await;
            stats.increment_validated();
        }

        Ok(rotated)
    }

    /// Drop the live token for a destroyed session
    pub async fn revoke_session(&self, session_id: &str) {
        let mut tokens = self.tokens.write().await;
        if tokens.remove(session_id).is_some() {
            debug!("Dropped anti-forgery token for session {}", session_id);
        }
    }

    /// Get anti-forgery statistics
    pub async fn stats(&self) -> CsrfStats {
        let stats = self.stats.read().await;
        stats.clone()
    }
}

impl std::fmt::Debug for CsrfGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfGuard")
            .field("tokens", &"<sensitive>")
            .field("stats", &self.stats)
            .finish()
    }
}

/// Anti-forgery statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CsrfStats {
    /// Number of tokens issued (including rotations)
    pub issued: u64,

    /// Number of successful validations
    pub validated: u64,

    /// Number of rejected submissions
    pub rejected: u64,

    /// Last token issued
    pub last_issued: Option<DateTime<Utc>>,
}

impl CsrfStats {
    /// Increment issued count
    pub fn increment_issued(&mut self) {
        self.issued += 1;
        self.last_issued = Some(Utc::now());
    }

    /// Increment validated count
    pub fn increment_validated(&mut self) {
        self.validated += 1;
    }

    /// Increment rejected count
    pub fn increment_rejected(&mut self) {
        self.rejected += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tokens::IssuedTokens;

    fn session() -> Session {
        let now = Utc::now();
        Session::from_issued(&IssuedTokens {
            user_id: "user-1".to_string(),
            roles: vec!["member".to_string()],
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            access_expires_at: now + chrono::Duration::seconds(900),
            refresh_expires_at: now + chrono::Duration::seconds(3600),
        })
    }

    fn guard() -> CsrfGuard {
        CsrfGuard::new(CsrfConfig::default())
    }

    #[tokio::test]
    async fn test_issue_and_validate() {
        let guard = guard();
        let session = session();

        let token = guard.issue(&session).await;
        assert_eq!(token.session_id, session.session_id);

        let rotated = guard
            .validate_and_rotate(&session, &token.value)
            .await
            .unwrap();
        assert_ne!(rotated.value, token.value);
    }

    #[tokio::test]
    async fn test_stale_token_fails_after_rotation() {
        let guard = guard();
        let session = session();

        let token = guard.issue(&session).await;
        let rotated = guard
            .validate_and_rotate(&session, &token.value)
            .await
            .unwrap();

        // The consumed value no longer validates
        let replay = guard.validate_and_rotate(&session, &token.value).await;
        assert!(matches!(replay, Err(crate::AccessError::CsrfMismatch)));

        // The rotated value does
        assert!(guard
            .validate_and_rotate(&session, &rotated.value)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_wrong_value_fails() {
        let guard = guard();
        let session = session();
        guard.issue(&session).await;

        let result = guard.validate_and_rotate(&session, "forged-value").await;
        assert!(matches!(result, Err(crate::AccessError::CsrfMismatch)));
        assert_eq!(guard.stats().await.rejected, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_fails() {
        let guard = guard();
        let session = session();

        let result = guard.validate_and_rotate(&session, "anything").await;
        assert!(matches!(result, Err(crate::AccessError::CsrfMismatch)));
    }

    #[tokio::test]
    async fn test_token_from_another_session_fails() {
        let guard = guard();
        let first = session();
        let second = session();

        let token = guard.issue(&first).await;
        guard.issue(&second).await;

        let result = guard.validate_and_rotate(&second, &token.value).await;
        assert!(matches!(result, Err(crate::AccessError::CsrfMismatch)));
    }

    #[tokio::test]
    async fn test_destroyed_session_always_fails() {
        let guard = guard();
        let session = session();

        let token = guard.issue(&session).await;
        guard.revoke_session(&session.session_id).await;

        let result = guard.validate_and_rotate(&session, &token.value).await;
        assert!(matches!(result, Err(crate::AccessError::CsrfMismatch)));
    }

    #[tokio::test]
    async fn test_reissue_replaces_not_appends() {
        let guard = guard();
        let session = session();

        let first = guard.issue(&session).await;
        let second = guard.issue(&session).await;

        // Only the latest value is live
        let stale = guard.validate_and_rotate(&session, &first.value).await;
        assert!(stale.is_err());
        assert!(guard
            .validate_and_rotate(&session, &second.value)
            .await
            .is_ok());
    }
}
