//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Anti-forgery token configuration

use serde::{Deserialize, Serialize};

/// Anti-forgery token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// Request header carrying the submitted token
    pub header_name: String,

    /// Byte length of generated token material
    pub token_bytes: usize,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header_name: "x-csrf-token".to_string(),
            token_bytes: crate::DEFAULT_CSRF_TOKEN_BYTES,
        }
    }
}
