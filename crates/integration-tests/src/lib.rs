//! Integration tests for Plooma.
//!
//! These tests drive a running server over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the server against a scratch database
//! cargo run -p plooma-cli -- migrate
//! cargo run -p plooma-web
//!
//! # Run integration tests
//! cargo test -p plooma-integration-tests -- --ignored
//! ```
//!
//! `PLOOMA_TEST_URL` overrides the server address (default
//! `http://localhost:3000`). The server must allow admin sign-up.
//!
//! Every test signs up fresh accounts from the same address, and the
//! sign-in and sign-up forms each allow `PLOOMA_AUTH_RATE_BURST` posts per
//! client before answering 429. Start the server with a larger burst, for
//! example `PLOOMA_AUTH_RATE_BURST=100`, when running the whole suite.

use reqwest::{Client, Response, StatusCode, header, redirect};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("PLOOMA_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build a cookie-keeping client that does not follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email address for one test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@plooma.test", Uuid::new_v4().simple())
}

/// The `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Sign up a fresh account on `client` and return its email.
///
/// # Panics
///
/// Panics if the request fails or sign-up does not redirect.
pub async fn sign_up(client: &Client, full_name: &str, role: &str) -> String {
    let email = unique_email(role);
    let resp = client
        .post(format!("{}/signup", base_url()))
        .form(&[
            ("full_name", full_name),
            ("email", email.as_str()),
            ("password", "secret123"),
            ("role", role),
        ])
        .send()
        .await
        .expect("Failed to sign up");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "sign-up should redirect");
    email
}

/// Sign in on `client` with the password [`sign_up`] uses.
///
/// # Panics
///
/// Panics if the request fails or sign-in does not redirect.
pub async fn sign_in(client: &Client, email: &str) {
    let resp = client
        .post(format!("{}/signin", base_url()))
        .form(&[("email", email), ("password", "secret123")])
        .send()
        .await
        .expect("Failed to sign in");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "sign-in should redirect");
}

/// GET a page and return its status and body.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn get_page(client: &Client, path: &str) -> (StatusCode, String) {
    let resp = client
        .get(format!("{}{path}", base_url()))
        .send()
        .await
        .expect("Failed to fetch page");
    let status = resp.status();
    (status, resp.text().await.expect("Failed to read response"))
}

/// Extract the first numeric id following `prefix` in `body`.
#[must_use]
pub fn first_id_after(body: &str, prefix: &str) -> Option<i32> {
    let start = body.find(prefix)? + prefix.len();
    let digits: String = body
        .get(start..)?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
