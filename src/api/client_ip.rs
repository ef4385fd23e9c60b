//! Caller address extraction.
//!
//! Behind a reverse proxy the first `X-Forwarded-For` hop is the client; otherwise the TCP peer
//! is. Dual-stack listeners report IPv4 peers as `::ffff:a.b.c.d`, so that prefix is removed
//! before the address reaches the engine.

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

const IPV4_MAPPED_PREFIX: &str = "::ffff:";
const IPV6_LOOPBACK: &str = "::1";

/// Raw client address: first forwarded hop, else the peer IP, else empty.
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(hop), _) => hop.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => String::new(),
    }
}

/// Strips IPv4-mapped notation and maps the IPv6 loopback to its IPv4 sentinel.
pub fn normalize(raw: &str) -> &str {
    let ip = raw.trim();
    let ip = ip.strip_prefix(IPV4_MAPPED_PREFIX).unwrap_or(ip);
    if ip == IPV6_LOOPBACK { "127.0.0.1" } else { ip }
}

/// Key the rate limiter counts requests under.
pub fn limiter_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(value), _) => value.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}
