//! Router assembly.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry hub and HTTP transaction
//! 2. Request ID
//! 3. `TraceLayer` span per request
//! 4. Security headers
//! 5. Session

use axum::{Router, extract::State, http::StatusCode, middleware::from_fn, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::middleware::{request_id_middleware, security_headers_middleware, session_layer};
use crate::routes;
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router around a session store.
pub fn router<Store>(state: AppState, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let sessions = session_layer(store, state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes(state.config()))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(sessions)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, Response, header},
    };
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::tests::test_config;
    use crate::db::create_lazy_pool;

    fn app() -> Router {
        let config = test_config();
        let pool = create_lazy_pool(&config.database_url).unwrap();
        router(AppState::new(config, pool), MemoryStore::default())
    }

    async fn get(uri: &str) -> Response<Body> {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("192.0.2.9:4242".parse::<SocketAddr>().unwrap()));
        request
    }

    async fn post_form(uri: &str, body: &str) -> Response<Body> {
        app().oneshot(form_request(uri, body)).await.unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response<Body>) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_health() {
        let response = get("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let response = get("/health/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_landing_page() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-frame-options").unwrap(),
            "DENY"
        );
        let body = body_text(response).await;
        assert!(body.contains("Why Choose Plooma?"));
        assert!(body.contains("Team Collaboration"));
        assert!(body.contains("Plooma. All rights reserved."));
    }

    #[tokio::test]
    async fn test_auth_pages_render() {
        let body = body_text(get("/signin").await).await;
        assert!(body.contains("Sign In"));

        let body = body_text(get("/signup").await).await;
        assert!(body.contains("Enter your full name"));
        assert!(body.contains("value=\"admin\""));
    }

    #[tokio::test]
    async fn test_flash_code_renders_banner() {
        let body = body_text(get("/signin?error=credentials").await).await;
        assert!(body.contains("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_anonymous_dashboard_redirects_to_signin() {
        let response = get("/dashboard/projects?q=web").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            Some("/signin?next=%2Fdashboard%2Fprojects%3Fq%3Dweb")
        );

        let response = get("/profile").await;
        assert_eq!(location(&response), Some("/signin?next=%2Fprofile"));

        let response = get("/dashboard/members").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_anonymous_mutation_redirects_to_signin() {
        let response = post_form("/dashboard/tasks/1/status", "status=done").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).is_some_and(|l| l.starts_with("/signin")));
    }

    #[tokio::test]
    async fn test_signin_with_malformed_email_is_rejected() {
        let response = post_form("/signin", "email=not-an-email&password=secret1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Invalid login credentials"));
        assert!(body.contains("value=\"not-an-email\""));
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_reset_rate_limit() {
        let app = app();
        let mut statuses = Vec::new();
        for n in 0..6 {
            let mut request = form_request("/signin", "email=not-an-email&password=secret1");
            request.headers_mut().insert(
                "x-forwarded-for",
                format!("203.0.113.{n}").parse().unwrap(),
            );
            statuses.push(app.clone().oneshot(request).await.unwrap().status());
        }
        assert!(statuses[..5].iter().all(|s| *s == StatusCode::OK));
        assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_signup_requires_every_field() {
        let response = post_form("/signup", "full_name=&email=a%40b.co&password=secret1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Please fill in all fields."));
    }

    #[tokio::test]
    async fn test_signout_redirects_to_signin() {
        let response = post_form("/signout", "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/signin?success=signed_out"));
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let response = get("/static/js/plooma.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert!(body_text(response).await.contains("data-debounce-submit"));
    }
}
