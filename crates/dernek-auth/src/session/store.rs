//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Token and session storage

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::tokens::IssuedTokens;

use super::model::Session;

#[derive(Debug, Default)]
struct StoreState {
    session: Option<Session>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Token store
///
/// Owns the current session metadata and token pair. Storage and expiry
/// bookkeeping only; lifecycle decisions belong to the session manager.
/// The refresh token accessor is crate-private so request-signing code
/// paths can never reach it.
#[derive(Clone)]
pub struct TokenStore {
    state: Arc<RwLock<StoreState>>,
}

impl TokenStore {
    /// Create an empty token store
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    /// Install a session and its token pair
    pub async fn install(&self, session: Session, issued: &IssuedTokens) {
        let mut state = self.state.write().await;
        state.session = Some(session);
        state.access_token = Some(issued.access_token.clone());
        state.refresh_token = Some(issued.refresh_token.clone());
    }

    /// Current session metadata, if any
    pub async fn session(&self) -> Option<Session> {
        let state = self.state.read().await;
        state.session.clone()
    }

    /// Current access token, only while it is within its lifetime
    pub async fn valid_access_token(&self) -> Option<String> {
        let state = self.state.read().await;
        match &state.session {
            Some(session) if !session.is_access_expired() => state.access_token.clone(),
            _ => None,
        }
    }

    /// Current refresh token
    ///
    /// Reachable only from the session manager's refresh path.
    pub(crate) async fn refresh_token(&self) -> Option<String> {
        let state = self.state.read().await;
        state.refresh_token.clone()
    }

    /// Apply the result of a refresh exchange
    ///
    /// Keeps the session identity, renews expiries and the token pair.
    /// Returns `None` when the session was destroyed while the exchange was
    /// in flight; the caller must treat the exchanged tokens as moot.
    pub async fn apply_refresh(&self, issued: &IssuedTokens) -> Option<Session> {
        let mut state = self.state.write().await;
        let session = match state.session.as_mut() {
            Some(session) => session,
            None => {
                debug!("Discarding refresh result for destroyed session");
                return None;
            }
        };

        session.access_expires_at = issued.access_expires_at;
        session.refresh_expires_at = issued.refresh_expires_at;
        let renewed = session.clone();

        state.access_token = Some(issued.access_token.clone());
        state.refresh_token = Some(issued.refresh_token.clone());

        Some(renewed)
    }

    /// Destroy the session and wipe the token pair
    ///
    /// Idempotent. Returns the refresh token that was live, so the caller
    /// can revoke it upstream.
    pub async fn destroy(&self) -> Option<String> {
        let mut state = self.state.write().await;
        state.session = None;
        state.access_token = None;
        state.refresh_token.take()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("state", &"<sensitive>")
            .finish()
    }
}
