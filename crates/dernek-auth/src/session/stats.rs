//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Session statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Session statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    /// Number of successful logins
    pub logins: u64,

    /// Number of failed logins
    pub failed_logins: u64,

    /// Number of successful refreshes
    pub refreshes: u64,

    /// Number of failed refreshes
    pub refresh_failures: u64,

    /// Number of logouts
    pub logouts: u64,

    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,

    /// Last successful refresh
    pub last_refresh: Option<DateTime<Utc>>,
}

impl SessionStats {
    /// Create new session statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment login count
    pub fn increment_logins(&mut self) {
        self.logins += 1;
        self.last_login = Some(Utc::now());
    }

    /// Increment failed login count
    pub fn increment_failed_logins(&mut self) {
        self.failed_logins += 1;
    }

    /// Increment refresh count
    pub fn increment_refreshes(&mut self) {
        self.refreshes += 1;
        self.last_refresh = Some(Utc::now());
    }

    /// Increment refresh failure count
    pub fn increment_refresh_failures(&mut self) {
        self.refresh_failures += 1;
    }

    /// Increment logout count
    pub fn increment_logouts(&mut self) {
        self.logouts += 1;
    }
}
