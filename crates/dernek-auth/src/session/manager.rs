//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Session lifecycle management

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::{SecurityConfig, SessionConfig};
use crate::tokens::{Credentials, IdentityProvider};

use super::model::Session;
use super::stats::SessionStats;
use super::store::TokenStore;

/// Session manager
///
/// Owns the token lifecycle: login, silent refresh, logout. Refresh
/// exchanges are single-flight: one serialized exchange per store, with
/// concurrent callers adopting the in-flight result instead of issuing
/// their own.
pub struct SessionManager {
    /// Session configuration
    session_config: SessionConfig,

    /// Security configuration
    security_config: SecurityConfig,

    /// Identity provider performing the actual exchanges
    provider: Arc<dyn IdentityProvider>,

    /// Token store
    store: TokenStore,

    /// Serializes refresh exchanges; queued callers re-check freshness
    /// after acquiring it
    refresh_gate: Mutex<()>,

    /// Login rate limiting per username
    rate_limits: Arc<RwLock<HashMap<String, RateLimitInfo>>>,

    /// Statistics
    stats: Arc<RwLock<SessionStats>>,
}

impl SessionManager {
    /// Create new session manager
    pub fn new(
        session_config: SessionConfig,
        security_config: SecurityConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            session_config,
            security_config,
            provider,
            store: TokenStore::new(),
            refresh_gate: Mutex::new(()),
            rate_limits: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(SessionStats::default())),
        }
    }

    /// Log in with credentials
    ///
    /// On success the fresh session and token pair replace whatever the
    /// store held before.
    pub async fn login(&self, credentials: &Credentials) -> crate::AccessResult<Session> {
        self.check_rate_limit(&credentials.username).await?;

        let wait = std::time::Duration::from_secs(self.session_config.login_timeout_secs);
        let issued = match timeout(wait, self.provider.authenticate(credentials)).await {
            Ok(Ok(issued)) => issued,
            Ok(Err(e)) => {
                let mut stats = self.stats.write().await;
                stats.increment_failed_logins();
                return Err(e);
            }
            Err(_) => {
                warn!("Login exchange exceeded {}s bound", wait.as_secs());
                return Err(crate::AccessError::Timeout("login".to_string()));
            }
        };

        let session = Session::from_issued(&issued);
        self.store.install(session.clone(), &issued).await;

        {
            let mut stats = self.stats.write().await;
            stats.increment_logins();
        }

        info!("Session {} opened for user {}", session.session_id, session.user_id);
        Ok(session)
    }

    /// Current session
    ///
    /// Returns the live session, refreshing silently when the access token
    /// has expired but the refresh token is still valid. Fails with
    /// `SessionExpired` when there is no recoverable session.
    pub async fn current_session(&self) -> crate::AccessResult<Session> {
        let session = self
            .store
            .session()
            .await
            .ok_or(crate::AccessError::SessionExpired)?;

        if !session.is_access_expired() {
            return Ok(session);
        }

        if !self.session_config.enable_refresh || session.is_refresh_expired() {
            self.store.destroy().await;
            return Err(crate::AccessError::SessionExpired);
        }

        self.refresh().await
    }

    /// Refresh the session token pair
    ///
    /// Single-flight: callers queue on the refresh gate. Whoever enters
    /// first performs the exchange; everyone queued behind re-checks the
    /// store and adopts the renewed session without a second exchange. On
    /// failure the session is destroyed so every queued caller observes
    /// `SessionExpired`.
    pub async fn refresh(&self) -> crate::AccessResult<Session> {
        let _gate = self.refresh_gate.lock().await;

        // Re-check after the wait: the winner may have renewed the pair
        // already, or a logout may have destroyed the session.
        let session = self
            .store
            .session()
            .await
            .ok_or(crate::AccessError::SessionExpired)?;

        if !session.is_access_expired() {
            debug!("Adopting refresh completed by concurrent caller");
            return Ok(session);
        }

        if session.is_refresh_expired() {
            self.store.destroy().await;
            return Err(crate::AccessError::SessionExpired);
        }

        let refresh_token = self
            .store
            .refresh_token()
            .await
            .ok_or(crate::AccessError::SessionExpired)?;

        let wait = std::time::Duration::from_secs(self.session_config.refresh_timeout_secs);
        match timeout(wait, self.provider.exchange_refresh(&refresh_token)).await {
            Ok(Ok(issued)) => match self.store.apply_refresh(&issued).await {
                Some(renewed) => {
                    let mut stats = self.stats.write().await;
                    stats.increment_refreshes();
                    info!("Session {} refreshed", renewed.session_id);
                    Ok(renewed)
                }
                None => {
                    // Logout landed while the exchange was in flight; the
                    // renewed pair is moot and must not outlive the session.
                    let _ = self.provider.revoke(&issued.refresh_token).await;
                    Err(crate::AccessError::SessionExpired)
                }
            },
            Ok(Err(e)) => {
                warn!("Refresh exchange failed: {}", e);
                self.store.destroy().await;
                let mut stats = self.stats.write().await;
                stats.increment_refresh_failures();
                Err(crate::AccessError::SessionExpired)
            }
            Err(_) => {
                warn!("Refresh exchange exceeded {}s bound", wait.as_secs());
                self.store.destroy().await;
                let mut stats = self.stats.write().await;
                stats.increment_refresh_failures();
                Err(crate::AccessError::SessionExpired)
            }
        }
    }

    /// Log out
    ///
    /// Destroys the session and token pair locally and revokes the refresh
    /// token upstream, best effort. Idempotent: logging out with no active
    /// session is a no-op. Does not wait for an in-flight refresh; its
    /// result is discarded against the destroyed store.
    pub async fn logout(&self) {
        let refresh_token = self.store.destroy().await;

        match refresh_token {
            Some(token) => {
                if let Err(e) = self.provider.revoke(&token).await {
                    warn!("Refresh token revocation failed: {}", e);
                }
                let mut stats = self.stats.write().await;
                stats.increment_logouts();
                info!("Session destroyed");
            }
            None => debug!("Logout with no active session"),
        }
    }

    /// Current session metadata without triggering a refresh
    pub async fn session_snapshot(&self) -> Option<Session> {
        self.store.session().await
    }

    /// Current access token, only while it is within its lifetime
    pub async fn access_token(&self) -> Option<String> {
        self.store.valid_access_token().await
    }

    /// Get session statistics
    pub async fn stats(&self) -> SessionStats {
        let stats = self.stats.read().await;
        stats.clone()
    }

    /// Check login rate limiting
    async fn check_rate_limit(&self, username: &str) -> crate::AccessResult<()> {
        if !self.security_config.enable_rate_limiting {
            return Ok(());
        }

        let now = Utc::now();
        let mut rate_limits = self.rate_limits.write().await;
        let limit_info = rate_limits
            .entry(username.to_string())
            .or_insert_with(|| RateLimitInfo {
                attempts: 0,
                window_start: now,
            });

        if now - limit_info.window_start > chrono::Duration::minutes(1) {
            limit_info.attempts = 0;
            limit_info.window_start = now;
        }

        if limit_info.attempts >= self.security_config.rate_limit_per_minute {
            warn!("Login rate limit exceeded for {}", username);
            return Err(crate::AccessError::RateLimitExceeded);
        }

        limit_info.attempts += 1;
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Rate limit information
#[derive(Debug, Clone)]
struct RateLimitInfo {
    attempts: usize,
    window_start: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;

    use crate::tokens::IssuedTokens;

    /// Provider stub whose first pair carries an already-expired access
    /// token, so the next `current_session` call must take the refresh path.
    struct StubProvider {
        exchanges: AtomicU64,
        fail_exchanges: bool,
        exchange_delay_ms: u64,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                exchanges: AtomicU64::new(0),
                fail_exchanges: false,
                exchange_delay_ms: 0,
            }
        }

        fn failing() -> Self {
            Self {
                fail_exchanges: true,
                ..Self::new()
            }
        }

        fn issued(access_secs: i64) -> IssuedTokens {
            let now = Utc::now();
            IssuedTokens {
                user_id: "user-1".to_string(),
                roles: vec!["member".to_string()],
                access_token: format!("access-{}", uuid::Uuid::new_v4()),
                refresh_token: format!("refresh-{}", uuid::Uuid::new_v4()),
                access_expires_at: now + chrono::Duration::seconds(access_secs),
                refresh_expires_at: now + chrono::Duration::seconds(3600),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn authenticate(
            &self,
            credentials: &Credentials,
        ) -> crate::AccessResult<IssuedTokens> {
            if credentials.password != "correct-horse" {
                return Err(crate::AccessError::InvalidCredentials);
            }
            // Expired access token forces the silent refresh path
            Ok(Self::issued(-1))
        }

        async fn exchange_refresh(
            &self,
            _refresh_token: &str,
        ) -> crate::AccessResult<IssuedTokens> {
            if self.exchange_delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.exchange_delay_ms))
                    .await;
            }
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            if self.fail_exchanges {
                return Err(crate::AccessError::SessionExpired);
            }
            Ok(Self::issued(900))
        }

        async fn revoke(&self, _refresh_token: &str) -> crate::AccessResult<()> {
            Ok(())
        }
    }

    fn manager(provider: Arc<StubProvider>) -> Arc<SessionManager> {
        Arc::new(SessionManager::new(
            SessionConfig::default(),
            SecurityConfig::default(),
            provider,
        ))
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            username: "ayse".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let manager = manager(Arc::new(StubProvider::new()));
        let session = manager.login(&credentials("correct-horse")).await.unwrap();
        assert_eq!(session.user_id, "user-1");
        assert_eq!(manager.stats().await.logins, 1);
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let manager = manager(Arc::new(StubProvider::new()));
        let result = manager.login(&credentials("wrong")).await;
        assert!(matches!(result, Err(crate::AccessError::InvalidCredentials)));
        assert_eq!(manager.stats().await.failed_logins, 1);
    }

    #[tokio::test]
    async fn test_current_session_without_login() {
        let manager = manager(Arc::new(StubProvider::new()));
        let result = manager.current_session().await;
        assert!(matches!(result, Err(crate::AccessError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_silent_refresh_on_expired_access_token() {
        let provider = Arc::new(StubProvider::new());
        let manager = manager(provider.clone());

        let opened = manager.login(&credentials("correct-horse")).await.unwrap();
        assert!(opened.is_access_expired());

        let refreshed = manager.current_session().await.unwrap();
        assert_eq!(refreshed.session_id, opened.session_id);
        assert!(!refreshed.is_access_expired());
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);

        // Immediately after, no further exchange happens
        let again = manager.current_session().await.unwrap();
        assert_eq!(again.session_id, opened.session_id);
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let provider = Arc::new(StubProvider {
            exchange_delay_ms: 50,
            ..StubProvider::new()
        });
        let manager = manager(provider.clone());
        manager.login(&credentials("correct-horse")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(
                async move { manager.current_session().await },
            ));
        }

        let mut session_ids = Vec::new();
        for handle in handles {
            let session = handle.await.unwrap().unwrap();
            session_ids.push(session.session_id);
        }

        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);
        session_ids.dedup();
        assert_eq!(session_ids.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_failure_expires_everyone() {
        let provider = Arc::new(StubProvider {
            exchange_delay_ms: 50,
            ..StubProvider::failing()
        });
        let manager = manager(provider.clone());
        manager.login(&credentials("correct-horse")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(
                async move { manager.current_session().await },
            ));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(crate::AccessError::SessionExpired)));
        }

        // One failed exchange, not eight
        assert_eq!(provider.exchanges.load(Ordering::SeqCst), 1);
        assert!(manager.current_session().await.is_err());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let manager = manager(Arc::new(StubProvider::new()));
        manager.logout().await;
        assert_eq!(manager.stats().await.logouts, 0);

        manager.login(&credentials("correct-horse")).await.unwrap();
        manager.logout().await;
        manager.logout().await;
        assert_eq!(manager.stats().await.logouts, 1);

        let result = manager.current_session().await;
        assert!(matches!(result, Err(crate::AccessError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_logout_during_refresh_discards_result() {
        let provider = Arc::new(StubProvider {
            exchange_delay_ms: 100,
            ..StubProvider::new()
        });
        let manager = manager(provider.clone());
        manager.login(&credentials("correct-horse")).await.unwrap();

        let refresher = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.current_session().await })
        };

        // Let the refresh get in flight, then destroy the session
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        manager.logout().await;

        let result = refresher.await.unwrap();
        assert!(matches!(result, Err(crate::AccessError::SessionExpired)));
        assert!(manager.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_login_rate_limit() {
        let security = SecurityConfig {
            rate_limit_per_minute: 3,
            ..SecurityConfig::default()
        };
        let manager = SessionManager::new(
            SessionConfig::default(),
            security,
            Arc::new(StubProvider::new()),
        );

        for _ in 0..3 {
            let _ = manager.login(&credentials("wrong")).await;
        }
        let result = manager.login(&credentials("correct-horse")).await;
        assert!(matches!(result, Err(crate::AccessError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn test_refresh_disabled_expires_session() {
        let session_config = SessionConfig {
            enable_refresh: false,
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(
            session_config,
            SecurityConfig::default(),
            Arc::new(StubProvider::new()),
        );

        manager.login(&credentials("correct-horse")).await.unwrap();
        let result = manager.current_session().await;
        assert!(matches!(result, Err(crate::AccessError::SessionExpired)));
    }
}
