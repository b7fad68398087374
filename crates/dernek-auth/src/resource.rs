//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Protected resource registration

use axum::http::Method;
use tracing::debug;

/// Access requirement for a registered resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredAccess {
    /// Reachable without a session
    Public,

    /// Requires the named permission
    Permission(String),
}

/// A route or endpoint under guard
#[derive(Debug, Clone)]
pub struct ProtectedResource {
    /// Path prefix the resource answers on
    pub path: String,

    /// Restricting method, or `None` for every method
    pub method: Option<Method>,

    /// Access requirement
    pub access: RequiredAccess,
}

/// Resolution of a request against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Matched a public resource
    Public,

    /// Matched a resource requiring the named permission
    Required(String),

    /// No registration matched; denied by default
    Unregistered,
}

/// Protected resource registry
///
/// Requests resolve by longest matching path prefix; a method-specific
/// registration beats a method-agnostic one on the same path. A path with
/// no registration is never public.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: Vec<ProtectedResource>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource
    pub fn register(mut self, resource: ProtectedResource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Register a public resource
    pub fn public(self, path: &str) -> Self {
        self.register(ProtectedResource {
            path: path.to_string(),
            method: None,
            access: RequiredAccess::Public,
        })
    }

    /// Register a resource requiring a permission on every method
    pub fn permission(self, path: &str, permission: &str) -> Self {
        self.register(ProtectedResource {
            path: path.to_string(),
            method: None,
            access: RequiredAccess::Permission(permission.to_string()),
        })
    }

    /// Register a resource requiring a permission on one method
    pub fn permission_for(self, path: &str, method: Method, permission: &str) -> Self {
        self.register(ProtectedResource {
            path: path.to_string(),
            method: Some(method),
            access: RequiredAccess::Permission(permission.to_string()),
        })
    }

    /// Resolve a request path and method
    pub fn resolve(&self, path: &str, method: &Method) -> Resolution {
        let mut best: Option<&ProtectedResource> = None;

        for resource in &self.resources {
            if !path.starts_with(&resource.path) {
                continue;
            }
            if let Some(required_method) = &resource.method {
                if required_method != method {
                    continue;
                }
            }

            let better = match best {
                None => true,
                Some(current) => {
                    resource.path.len() > current.path.len()
                        || (resource.path.len() == current.path.len()
                            && resource.method.is_some()
                            && current.method.is_none())
                }
            };
            if better {
                best = Some(resource);
            }
        }

        match best {
            Some(resource) => match &resource.access {
                RequiredAccess::Public => Resolution::Public,
                RequiredAccess::Permission(permission) => {
                    Resolution::Required(permission.clone())
                }
            },
            None => {
                debug!("No registration for {} {}, denying by default", method, path);
                Resolution::Unregistered
            }
        }
    }

    /// Number of registered resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Whether a method changes state and therefore needs anti-forgery proof
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
