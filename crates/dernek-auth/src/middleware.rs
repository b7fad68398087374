//! SPDX-FileCopyrightText: © 2025 Dernek Yönetim Sistemi Team
//! SPDX-License-Identifier: Apache-2.0
//!

//! Access enforcement middleware for HTTP requests

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::config::security::SecurityHeaders;
use crate::guard::{AccessGuard, AccessRequest, Verdict};

/// Enforce access on every request
///
/// Consults the guard and either forwards the request with the
/// [`crate::guard::AccessGrant`] inserted as a request extension, or
/// short-circuits with a fixed generic body. A rotated anti-forgery token
/// is echoed back in the configured header. Denied responses never carry
/// resource content.
pub async fn enforce_access(
    State(guard): State<Arc<AccessGuard>>,
    request: Request,
    next: Next,
) -> Response {
    let access_request = AccessRequest {
        path: request.uri().path().to_string(),
        method: request.method().clone(),
        csrf_token: request
            .headers()
            .get(guard.csrf().header_name())
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string()),
    };

    let headers = guard.config().security.security_headers.clone();

    match guard.authorize(&access_request).await {
        Verdict::Allowed(grant) => {
            debug!("Request to {} allowed", access_request.path);
            let rotated = grant.csrf_token.clone();

            let mut request = request;
            request.extensions_mut().insert(grant);
            let mut response = next.run(request).await;

            if let Some(token) = rotated {
                if let (Ok(name), Ok(value)) = (
                    HeaderName::from_bytes(guard.csrf().header_name().as_bytes()),
                    HeaderValue::from_str(&token.value),
                ) {
                    response.headers_mut().insert(name, value);
                }
            }

            apply_security_headers(&mut response, &headers);
            response
        }
        Verdict::Unauthenticated => deny_response(
            StatusCode::UNAUTHORIZED,
            "authentication required",
            &headers,
        ),
        Verdict::Forbidden => deny_response(StatusCode::FORBIDDEN, "access denied", &headers),
        Verdict::CsrfRejected => {
            deny_response(StatusCode::FORBIDDEN, "invalid request token", &headers)
        }
    }
}

/// Build a denial response with a fixed generic body
///
/// The body depends only on the verdict kind, never on the resource.
fn deny_response(status: StatusCode, message: &str, headers: &SecurityHeaders) -> Response {
    let mut response =
        (status, Json(serde_json::json!({ "error": message }))).into_response();
    apply_security_headers(&mut response, headers);
    response
}

/// Attach configured security headers to a response
fn apply_security_headers(response: &mut Response, headers: &SecurityHeaders) {
    let header_map = response.headers_mut();

    if headers.enable_content_type_options {
        header_map.insert(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        );
    }
    if headers.enable_frame_options {
        header_map.insert(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        );
    }
    if headers.enable_xss_protection {
        header_map.insert(
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        );
    }
    if headers.enable_referrer_policy {
        header_map.insert(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Method, Request as HttpRequest};
    use axum::routing::{get, post};
    use axum::Router;
    use tower::ServiceExt;

    use crate::config::AccessConfig;
    use crate::resource::ResourceRegistry;
    use crate::tokens::{Credentials, MemoryIdentityProvider};

    const MEMBER_NAMES: [&str; 2] = ["Fatma Aydın", "Mehmet Demir"];

    async fn guard(roles: Vec<&str>) -> Arc<AccessGuard> {
        let config = AccessConfig::default();
        let provider = MemoryIdentityProvider::new(
            config.tokens.clone(),
            config.security.clone(),
        );
        provider
            .register_user(
                "ayse",
                "correct-horse",
                roles.iter().map(|r| r.to_string()).collect(),
            )
            .await
            .unwrap();

        let registry = ResourceRegistry::new()
            .public("/health")
            .permission_for("/api/members", Method::GET, "members:view")
            .permission_for("/api/members", Method::POST, "members:edit");

        Arc::new(AccessGuard::new(config, Arc::new(provider), registry).unwrap())
    }

    fn app(guard: Arc<AccessGuard>) -> Router {
        async fn list_members() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "members": [
                    { "name": MEMBER_NAMES[0], "amount": 250 },
                    { "name": MEMBER_NAMES[1], "amount": 100 },
                ]
            }))
        }

        async fn create_member() -> StatusCode {
            StatusCode::CREATED
        }

        async fn health() -> &'static str {
            "ok"
        }

        Router::new()
            .route("/health", get(health))
            .route("/api/members", get(list_members).post(create_member))
            .layer(axum::middleware::from_fn_with_state(
                guard.clone(),
                enforce_access,
            ))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn login(guard: &Arc<AccessGuard>) -> String {
        let (_, csrf_token) = guard
            .login(&Credentials {
                username: "ayse".to_string(),
                password: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        csrf_token.value
    }

    #[tokio::test]
    async fn test_public_route_without_session() {
        let guard = guard(vec!["member"]).await;
        let response = app(guard)
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unauthenticated_gets_401_with_generic_body() {
        let guard = guard(vec!["admin"]).await;
        let response = app(guard)
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/members")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        let body = body_string(response).await;
        assert_eq!(body, r#"{"error":"authentication required"}"#);
    }

    #[tokio::test]
    async fn test_forbidden_body_excludes_member_fields() {
        let guard = guard(vec!["member"]).await;
        login(&guard).await;

        let response = app(guard)
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/members")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_string(response).await;
        assert_eq!(body, r#"{"error":"access denied"}"#);
        for name in MEMBER_NAMES {
            assert!(!body.contains(name));
        }
        assert!(!body.contains("amount"));
    }

    #[tokio::test]
    async fn test_allowed_request_reaches_handler() {
        let guard = guard(vec!["admin"]).await;
        login(&guard).await;

        let response = app(guard)
            .oneshot(
                HttpRequest::builder()
                    .uri("/api/members")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains(MEMBER_NAMES[0]));
    }

    #[tokio::test]
    async fn test_post_without_token_rejected_with_distinct_body() {
        let guard = guard(vec!["admin"]).await;
        login(&guard).await;

        let response = app(guard)
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/members")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_string(response).await;
        assert_eq!(body, r#"{"error":"invalid request token"}"#);
    }

    #[tokio::test]
    async fn test_post_with_token_rotates_via_response_header() {
        let guard = guard(vec!["admin"]).await;
        let csrf_value = login(&guard).await;

        let response = app(guard.clone())
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/members")
                    .header("x-csrf-token", &csrf_value)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let rotated = response
            .headers()
            .get("x-csrf-token")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert_ne!(rotated, csrf_value);

        // The original value is spent
        let replay = app(guard)
            .oneshot(
                HttpRequest::builder()
                    .method(Method::POST)
                    .uri("/api/members")
                    .header("x-csrf-token", &csrf_value)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    }
}
