//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Token issuing backend

pub mod claims;
pub mod provider;
pub mod stats;

pub use claims::AccessClaims;
pub use provider::{Credentials, IdentityProvider, IssuedTokens, MemoryIdentityProvider};
pub use stats::TokenStats;
