//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Main enforcement module

use std::sync::Arc;

use axum::http::Method;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::AccessConfig;
use crate::csrf::{CsrfGuard, CsrfToken};
use crate::policy::{Decision, PolicyEngine};
use crate::resource::{self, Resolution, ResourceRegistry};
use crate::session::{Session, SessionManager};
use crate::tokens::{Credentials, IdentityProvider};

/// Access control result type
pub type AccessResult<T> = Result<T, AccessError>;

/// Access control error
///
/// Security-sensitive variants are fieldless so nothing about the failed
/// check can leak into a user-facing message.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("session expired")]
    SessionExpired,

    #[error("access forbidden")]
    Forbidden,

    #[error("invalid request token")]
    CsrfMismatch,

    #[error("permission policy unavailable")]
    PolicyUnavailable,

    #[error("account locked")]
    AccountLocked,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("{0} timed out")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AccessError {
    pub fn internal(msg: String) -> Self {
        Self::Internal(msg)
    }
}

/// Terminal verdict of an authorization attempt
///
/// The denial variants are fieldless on purpose: the deny path never holds
/// a reference to any resource payload, so a denied response cannot leak
/// protected content.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Request may proceed
    Allowed(AccessGrant),

    /// No valid session; redirect-to-login semantics
    Unauthenticated,

    /// Session lacks the required permission, or the resource is
    /// unregistered
    Forbidden,

    /// Anti-forgery proof missing or invalid
    CsrfRejected,
}

impl Verdict {
    /// Whether the request may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed(_))
    }
}

/// Grant accompanying an allowed request
#[derive(Debug, Clone)]
pub struct AccessGrant {
    /// Authenticated session, absent only for public resources
    pub session: Option<Session>,

    /// Rotated anti-forgery token after a mutating request
    pub csrf_token: Option<CsrfToken>,
}

/// An authorization attempt
#[derive(Debug, Clone)]
pub struct AccessRequest {
    /// Request path
    pub path: String,

    /// Request method
    pub method: Method,

    /// Submitted anti-forgery token, if any
    pub csrf_token: Option<String>,
}

impl AccessRequest {
    /// Create a read request
    pub fn read(path: &str) -> Self {
        Self {
            path: path.to_string(),
            method: Method::GET,
            csrf_token: None,
        }
    }

    /// Create a mutating request
    pub fn mutate(path: &str, method: Method, csrf_token: Option<String>) -> Self {
        Self {
            path: path.to_string(),
            method,
            csrf_token,
        }
    }
}

/// Access guard
///
/// The single enforcement point consulted by route transitions and
/// mutating requests. Composes the session manager, policy engine, and
/// anti-forgery guard into one verdict.
pub struct AccessGuard {
    /// Configuration
    config: AccessConfig,

    /// Session manager
    sessions: Arc<SessionManager>,

    /// Policy engine
    policy: Arc<PolicyEngine>,

    /// Anti-forgery guard
    csrf: Arc<CsrfGuard>,

    /// Protected resource registry
    registry: ResourceRegistry,

    /// Statistics
    stats: Arc<RwLock<GuardStats>>,
}

impl AccessGuard {
    /// Create new access guard
    pub fn new(
        config: AccessConfig,
        provider: Arc<dyn IdentityProvider>,
        registry: ResourceRegistry,
    ) -> AccessResult<Self> {
        config.validate()?;

        let sessions = Arc::new(SessionManager::new(
            config.session.clone(),
            config.security.clone(),
            provider,
        ));
        let policy = Arc::new(PolicyEngine::new(&config.policy)?);
        let csrf = Arc::new(CsrfGuard::new(config.csrf.clone()));

        Ok(Self {
            config,
            sessions,
            policy,
            csrf,
            registry,
            stats: Arc::new(RwLock::new(GuardStats::default())),
        })
    }

    /// Log in and issue the session's first anti-forgery token
    pub async fn login(&self, credentials: &Credentials) -> AccessResult<(Session, CsrfToken)> {
        let session = self.sessions.login(credentials).await?;
        let csrf_token = self.csrf.issue(&session).await;
        Ok((session, csrf_token))
    }

    /// Log out, destroying the session and its anti-forgery token
    ///
    /// Idempotent, like the underlying session destroy.
    pub async fn logout(&self) {
        if let Some(session) = self.sessions.session_snapshot().await {
            self.csrf.revoke_session(&session.session_id).await;
        }
        self.sessions.logout().await;
    }

    /// Authorize a request
    ///
    /// Walks the enforcement states in order: resource resolution, session
    /// check (with silent refresh), permission evaluation, anti-forgery
    /// validation for mutating methods. Every failure maps to a fieldless
    /// denial verdict; an unavailable policy table denies, never allows.
    pub async fn authorize(&self, request: &AccessRequest) -> Verdict {
        let resolution = self.registry.resolve(&request.path, &request.method);

        // Public resources bypass the session gate entirely
        if resolution == Resolution::Public {
            let verdict = Verdict::Allowed(AccessGrant {
                session: None,
                csrf_token: None,
            });
            self.record(&verdict).await;
            return verdict;
        }

        let session = match self.sessions.current_session().await {
            Ok(session) => session,
            Err(e) => {
                debug!("Unauthenticated request to {}: {}", request.path, e);
                let verdict = Verdict::Unauthenticated;
                self.record(&verdict).await;
                return verdict;
            }
        };

        let permission = match resolution {
            Resolution::Required(permission) => permission,
            Resolution::Unregistered => {
                warn!(
                    "Denying unregistered resource {} {}",
                    request.method, request.path
                );
                let verdict = Verdict::Forbidden;
                self.record(&verdict).await;
                return verdict;
            }
            Resolution::Public => unreachable!("public resources return early"),
        };

        match self.policy.evaluate(&session.roles, &permission) {
            Ok(Decision::Allow) => {}
            Ok(Decision::Deny) => {
                info!(
                    "User {} denied {} on {}",
                    session.user_id, permission, request.path
                );
                let verdict = Verdict::Forbidden;
                self.record(&verdict).await;
                return verdict;
            }
            Err(e) => {
                // Fail closed: an unreadable table must never permit
                warn!("Policy evaluation unavailable, denying: {}", e);
                let verdict = Verdict::Forbidden;
                self.record(&verdict).await;
                return verdict;
            }
        }

        let csrf_token = if resource::is_mutating(&request.method) {
            let supplied = match &request.csrf_token {
                Some(supplied) => supplied,
                None => {
                    warn!(
                        "Mutating request to {} without anti-forgery token",
                        request.path
                    );
                    let verdict = Verdict::CsrfRejected;
                    self.record(&verdict).await;
                    return verdict;
                }
            };

            match self.csrf.validate_and_rotate(&session, supplied).await {
                Ok(rotated) => Some(rotated),
                Err(_) => {
                    let verdict = Verdict::CsrfRejected;
                    self.record(&verdict).await;
                    return verdict;
                }
            }
        } else {
            None
        };

        let verdict = Verdict::Allowed(AccessGrant {
            session: Some(session),
            csrf_token,
        });
        self.record(&verdict).await;
        verdict
    }

    /// Get session manager
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Get policy engine
    pub fn policy(&self) -> &Arc<PolicyEngine> {
        &self.policy
    }

    /// Get anti-forgery guard
    pub fn csrf(&self) -> &Arc<CsrfGuard> {
        &self.csrf
    }

    /// Configuration the guard was built with
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Get guard statistics
    pub async fn stats(&self) -> GuardStats {
        let stats = self.stats.read().await;
        stats.clone()
    }

    async fn record(&self, verdict: &Verdict) {
        let mut stats = self.stats.write().await;
        stats.record_verdict(verdict);
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("config", &"<sensitive>")
            .field("sessions", &self.sessions)
            .field("policy", &self.policy)
            .field("csrf", &self.csrf)
            .field("registry", &self.registry)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Guard statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct GuardStats {
    /// Number of allowed requests
    pub allowed: u64,

    /// Number of unauthenticated denials
    pub denied_unauthenticated: u64,

    /// Number of permission denials
    pub denied_forbidden: u64,

    /// Number of anti-forgery denials
    pub denied_csrf: u64,

    /// Last decision
    pub last_decision: Option<DateTime<Utc>>,
}

impl GuardStats {
    /// Record a verdict
    pub fn record_verdict(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Allowed(_) => self.allowed += 1,
            Verdict::Unauthenticated => self.denied_unauthenticated += 1,
            Verdict::Forbidden => self.denied_forbidden += 1,
            Verdict::CsrfRejected => self.denied_csrf += 1,
        }
        self.last_decision = Some(Utc::now());
    }
}
