//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Policy evaluation statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Policy evaluation statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct PolicyStats {
    /// Number of evaluations performed
    pub evaluations: u64,

    /// Number of allow decisions
    pub allowed: u64,

    /// Number of deny decisions
    pub denied: u64,

    /// Number of table reloads
    pub reloads: u64,

    /// Last evaluation
    pub last_evaluation: Option<DateTime<Utc>>,
}

impl PolicyStats {
    /// Create new policy statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an evaluation outcome
    pub fn record_evaluation(&mut self, allowed: bool) {
        self.evaluations += 1;
        if allowed {
            self.allowed += 1;
        } else {
            self.denied += 1;
        }
        self.last_evaluation = Some(Utc::now());
    }

    /// Increment table reload count
    pub fn increment_reloads(&mut self) {
        self.reloads += 1;
    }

    /// Get allow rate
    pub fn allow_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.allowed as f64 / self.evaluations as f64
        }
    }
}
