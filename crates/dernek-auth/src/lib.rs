//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Access control core for the Dernek association management backend
//!
//! This crate owns every access decision made in front of the
//! administrative resources (member lists, donation records, beneficiary
//! records): the session and token lifecycle, role-based permission
//! evaluation, and anti-forgery defense for state-changing requests.
//!
//! # Features
//!
//! - **Session Lifecycle**: Login, silent single-flight refresh, and
//!   idempotent logout over an exchangeable identity provider
//! - **Role-Based Access Control**: Deny-by-default permission evaluation
//!   against an immutable, atomically swappable role table
//! - **Anti-Forgery Defense**: Per-session rotating CSRF tokens with
//!   constant-time validation
//! - **Enforcement Point**: A single guard translating every request into
//!   one of four verdicts, with leak-free denial responses
//! - **HTTP Middleware**: Ready-to-use middleware for Axum web frameworks
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dernek_auth::{
//!     AccessConfig, AccessGuard, AccessRequest, Credentials,
//!     MemoryIdentityProvider, ResourceRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AccessConfig::default();
//!     let provider = MemoryIdentityProvider::new(
//!         config.tokens.clone(),
//!         config.security.clone(),
//!     );
//!     provider
//!         .register_user("ayse", "correct-horse", vec!["admin".to_string()])
//!         .await?;
//!
//!     let registry = ResourceRegistry::new()
//!         .public("/login")
//!         .permission("/api/members", "members:view");
//!
//!     let guard = AccessGuard::new(config, Arc::new(provider), registry)?;
//!
//!     let (session, csrf_token) = guard
//!         .login(&Credentials {
//!             username: "ayse".to_string(),
//!             password: "correct-horse".to_string(),
//!         })
//!         .await?;
//!     println!("session {} for {}", session.session_id, session.user_id);
//!
//!     let verdict = guard.authorize(&AccessRequest::read("/api/members")).await;
//!     assert!(verdict.is_allowed());
//!     drop(csrf_token);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Denial Semantics
//!
//! Every non-allowed verdict is fieldless and maps to a fixed generic
//! response body, so a denied request can never echo protected content.
//! An unavailable permission table denies; it never falls open.

pub mod config;
pub mod csrf;
pub mod guard;
pub mod middleware;
pub mod policy;
pub mod resource;
pub mod session;
pub mod tokens;

// Re-export commonly used types
pub use config::{
    AccessConfig, CsrfConfig, PolicyConfig, SecurityConfig, SessionConfig, TokenConfig,
};
pub use csrf::{CsrfGuard, CsrfStats, CsrfToken};
pub use guard::{
    AccessError, AccessGrant, AccessGuard, AccessRequest, AccessResult, GuardStats, Verdict,
};
pub use middleware::enforce_access;
pub use policy::{Decision, PermissionTable, PolicyEngine, PolicyStats};
pub use resource::{ProtectedResource, RequiredAccess, Resolution, ResourceRegistry};
pub use session::{Session, SessionManager, SessionStats, TokenStore};
pub use tokens::{
    AccessClaims, Credentials, IdentityProvider, IssuedTokens, MemoryIdentityProvider, TokenStats,
};

/// Access control version
pub const ACCESS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default access token lifetime in seconds (15 minutes)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 15 * 60;

/// Default refresh token lifetime in seconds (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default anti-forgery token length in bytes
pub const DEFAULT_CSRF_TOKEN_BYTES: usize = 32;

/// Default account lockout duration in seconds (15 minutes)
pub const DEFAULT_LOCKOUT_DURATION_SECS: u64 = 15 * 60;

/// Initialize the access control core
///
/// Validates the configuration and wires the session manager, policy
/// engine, and anti-forgery guard into an [`AccessGuard`].
///
/// # Arguments
///
/// * `config` - The access control configuration
/// * `provider` - The identity provider backing credential and refresh exchanges
/// * `registry` - The protected resource registry
///
/// # Returns
///
/// Returns a `Result` containing the initialized `AccessGuard` or an error
/// if the configuration is invalid.
pub fn init_access_control(
    config: AccessConfig,
    provider: std::sync::Arc<dyn IdentityProvider>,
    registry: ResourceRegistry,
) -> AccessResult<AccessGuard> {
    tracing::info!("Initializing access control core v{}", ACCESS_VERSION);

    let guard = AccessGuard::new(config, provider, registry)?;

    tracing::info!("Access control core initialization completed");
    Ok(guard)
}

/// Shutdown the access control core
///
/// Destroys any live session and its anti-forgery token before the guard
/// is dropped.
pub async fn shutdown_access_control(guard: AccessGuard) {
    tracing::info!("Shutting down access control core");

    guard.logout().await;

    tracing::info!("Access control core shutdown completed");
}
