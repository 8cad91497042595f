//! Rate limiting for the sign-in and sign-up form submissions.
//!
//! Requests are keyed on the socket peer address. Proxy headers are only
//! read when `PLOOMA_TRUST_PROXY_HEADERS` is set, and then only the
//! right-most `X-Forwarded-For` hop, which is the one our proxy appended.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::PloomaConfig;

/// Seconds to replenish one request in the auth bucket.
const AUTH_REPLENISH_SECONDS: u64 = 6;

/// Key extractor for the client IP address.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req, self.trust_proxy_headers).ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Client IP for a request, or `None` if the server was not started with
/// connect info and no trusted header names one.
fn client_ip<T>(req: &Request<T>, trust_proxy_headers: bool) -> Option<IpAddr> {
    if trust_proxy_headers && let Some(ip) = forwarded_ip(req) {
        return Some(ip);
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

/// Right-most `X-Forwarded-For` hop, then `X-Real-IP`.
fn forwarded_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    let headers = req.headers();

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.rsplit(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create a rate limiter for one auth endpoint.
///
/// One request replenishes every 6 seconds, with a burst of
/// `PLOOMA_AUTH_RATE_BURST` (default 5). Every call builds a separate
/// bucket, so sign-in and sign-up are limited independently.
///
/// # Panics
///
/// This function will not panic. The replenish period is a non-zero
/// constant and the burst is a `NonZeroU32`, which `GovernorConfigBuilder`
/// always accepts.
#[must_use]
pub fn auth_rate_limiter(config: &PloomaConfig) -> RateLimiterLayer {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(config.trust_proxy_headers))
        .per_second(AUTH_REPLENISH_SECONDS)
        .burst_size(config.auth_rate_burst.get())
        .finish()
        .expect("rate limiter config with a non-zero period and burst is valid");
    GovernorLayer::new(Arc::new(governor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn forwarded_request() -> Request<()> {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.9:4242".parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_ignores_proxy_headers_by_default() {
        assert_eq!(client_ip(&forwarded_request(), false), Some(ip("192.0.2.9")));
    }

    #[test]
    fn test_trusted_proxy_uses_rightmost_hop() {
        assert_eq!(client_ip(&forwarded_request(), true), Some(ip("10.0.0.1")));
    }

    #[test]
    fn test_trusted_proxy_falls_back_to_real_ip() {
        let req = Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req, true), Some(ip("198.51.100.2")));
    }

    #[test]
    fn test_trusted_proxy_with_garbage_header_uses_peer() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, unknown")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.9:4242".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_ip(&req, true), Some(ip("192.0.2.9")));
    }

    #[test]
    fn test_missing_connect_info_cannot_be_keyed() {
        use tower_governor::key_extractor::KeyExtractor;

        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(())
            .unwrap();
        assert!(matches!(
            ClientIpKeyExtractor::default().extract(&req),
            Err(GovernorError::UnableToExtractKey)
        ));
    }
}
