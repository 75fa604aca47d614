//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - `lead_rate_limiter`: lead intake (1 per 6 s, burst 5)
//! - `auth_rate_limiter`: sign-in and sign-up (1 per 6 s, burst 5)
//! - `beacon_rate_limiter`: analytics beacon (1 per s, burst 50)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP
// =============================================================================

/// Real client IP from proxy headers.
///
/// Checks `CF-Connecting-IP`, the first `X-Forwarded-For` hop, `X-Real-IP`
/// and `Fly-Client-IP`, in that order.
#[must_use]
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    header("cf-connecting-ip")
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse().ok())
        })
        .or_else(|| header("x-real-ip").and_then(|s| s.trim().parse().ok()))
        .or_else(|| header("fly-client-ip").and_then(|s| s.trim().parse().ok()))
}

/// Client IP from proxy headers, falling back to the socket peer address.
#[must_use]
pub fn client_ip(headers: &HeaderMap, extensions: &axum::http::Extensions) -> Option<IpAddr> {
    forwarded_ip(headers).or_else(|| {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Key extractor for the rate limiters.
///
/// Requests whose origin cannot be determined share a single bucket instead
/// of being rejected.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(client_ip(req.headers(), req.extensions())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)))
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(period_secs: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(period_secs)
        .burst_size(burst)
        .finish()
        .expect("rate limiter config with positive period and burst is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Lead intake: ~10 submissions per minute per IP, burst of 5.
///
/// # Panics
///
/// Does not panic: the period and burst are positive constants.
#[must_use]
pub fn lead_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// Sign-in and sign-up: ~10 attempts per minute per IP, burst of 5.
///
/// # Panics
///
/// Does not panic: the period and burst are positive constants.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    limiter(6, 5)
}

/// Analytics beacon: sustained 1/s per IP with a burst of 50.
///
/// # Panics
///
/// Does not panic: the period and burst are positive constants.
#[must_use]
pub fn beacon_rate_limiter() -> RateLimiterLayer {
    limiter(1, 50)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_cloudflare_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.4"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        assert_eq!(forwarded_ip(&headers), Some("198.51.100.4".parse().unwrap()));
    }

    #[test]
    fn test_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(forwarded_ip(&headers), Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_no_headers_falls_back_to_shared_bucket() {
        let request = Request::builder().body(()).unwrap();
        let key = tower_governor::key_extractor::KeyExtractor::extract(
            &ClientIpKeyExtractor,
            &request,
        )
        .unwrap();
        assert_eq!(key, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_connect_info_fallback() {
        let mut request = Request::builder().body(()).unwrap();
        let addr: SocketAddr = "192.0.2.10:51000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(
            client_ip(request.headers(), request.extensions()),
            Some("192.0.2.10".parse().unwrap())
        );
    }
}
