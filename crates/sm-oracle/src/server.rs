//! Builds and serves the auth oracle's axum router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use sm_credentials::CredentialStore;
use tracing::info;

use crate::handlers;

/// Builds the router serving `/auth`, `/superuser` and `/acl` against a
/// shared `CredentialStore`. Exposed separately from [`serve`] so tests
/// can drive it in-process without binding a socket.
pub fn build_router(store: Arc<CredentialStore>) -> Router {
    Router::new()
        .route("/auth", post(handlers::auth))
        .route("/superuser", post(handlers::superuser))
        .route("/acl", post(handlers::acl))
        .with_state(store)
}

/// Binds `addr` and serves the oracle until the process exits or the
/// listener errors. There is no graceful-shutdown contract — the core
/// has none (see the crate-level design notes).
pub async fn serve(addr: SocketAddr, store: Arc<CredentialStore>) -> std::io::Result<()> {
    let router = build_router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "auth oracle listening");
    axum::serve(listener, router).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn test_store(dir: &std::path::Path) -> Arc<CredentialStore> {
        let store = CredentialStore::load_or_create(dir.join("auth.json"), "admin-token", "driver-token")
            .await
            .unwrap();
        Arc::new(store)
    }

    fn form_request(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn auth_grants_known_administrator() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_store(dir.path()).await);

        let resp = router
            .oneshot(form_request("/auth", "username=system&password=admin-token"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn auth_denies_unknown_principal() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_store(dir.path()).await);

        let resp = router
            .oneshot(form_request("/auth", "username=nobody&password=wrong"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn auth_denies_malformed_body_instead_of_500() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_store(dir.path()).await);

        let req = Request::builder()
            .method("POST")
            .uri("/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not form encoded"))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn superuser_grants_only_fixed_principals() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_store(dir.path()).await);

        let resp = router
            .clone()
            .oneshot(form_request("/superuser", "username=sensor-driver"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = router
            .oneshot(form_request("/superuser", "username=some-sensor"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn acl_grants_system_full_access_and_denies_unknown_topic_for_others() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_store(dir.path()).await);

        let resp = router
            .clone()
            .oneshot(form_request("/acl", "username=system&topic=/anything&acc=1"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = router
            .oneshot(form_request("/acl", "username=ghost&topic=/anything&acc=1"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn acl_denies_unknown_access_code() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_store(dir.path()).await);

        let resp = router
            .oneshot(form_request(
                "/acl",
                "username=sensor-driver&topic=/sensor-manager/sensor-incoming&acc=99",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
