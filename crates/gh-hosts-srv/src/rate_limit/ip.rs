//! Client address extraction for rate-limit keys.

use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

/// Key used when no client address can be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Normalize a client address for use as a counter key.
///
/// IPv6 addresses collapse to their /64 prefix (`a:b:c:d::`) so one client
/// cannot dodge the limit by rotating through its subnet. IPv4-mapped IPv6
/// addresses become plain IPv4. Anything unparseable is returned trimmed and
/// lowercased.
pub fn normalize_ip(raw: &str) -> String {
    let trimmed = raw.trim();
    let unbracketed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);
    let unzoned = unbracketed.split('%').next().unwrap_or(unbracketed);

    match unzoned.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.to_string(),
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => prefix64(v6),
        },
        Err(_) => trimmed.to_ascii_lowercase(),
    }
}

fn prefix64(addr: Ipv6Addr) -> String {
    let s = addr.segments();
    format!("{:x}:{:x}:{:x}:{:x}::", s[0], s[1], s[2], s[3])
}

/// Determine the client address of a request.
///
/// Proxy headers are consulted first: `CF-Connecting-IP`, the first
/// `X-Forwarded-For` hop, then `X-Real-IP`. The socket peer is the last
/// resort.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let from_headers = header("cf-connecting-ip")
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .or_else(|| header("x-real-ip"));

    match (from_headers, peer) {
        (Some(ip), _) => normalize_ip(ip),
        (None, Some(addr)) => normalize_ip(&addr.ip().to_string()),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_ipv4_unchanged() {
        assert_eq!(normalize_ip("203.0.113.7"), "203.0.113.7");
        assert_eq!(normalize_ip(" 203.0.113.7 "), "203.0.113.7");
    }

    #[test]
    fn test_ipv6_prefix() {
        assert_eq!(normalize_ip("2001:db8:85a3:1:2:3:4:5"), "2001:db8:85a3:1::");
        assert_eq!(normalize_ip("2001:DB8::1"), "2001:db8:0:0::");
        assert_eq!(normalize_ip("[2001:db8::1]"), "2001:db8:0:0::");
        assert_eq!(normalize_ip("fe80::1%eth0"), "fe80:0:0:0::");
    }

    #[test]
    fn test_ipv6_normalization_is_idempotent() {
        for raw in ["2001:db8:85a3:1:2:3:4:5", "::1", "fe80::1%eth0", "2001:db8::"] {
            let once = normalize_ip(raw);
            assert_eq!(normalize_ip(&once), once, "{raw}");
        }
    }

    #[test]
    fn test_mapped_ipv4() {
        assert_eq!(normalize_ip("::ffff:192.0.2.1"), "192.0.2.1");
    }

    #[test]
    fn test_garbage_passthrough() {
        assert_eq!(normalize_ip(" Not-An-IP "), "not-an-ip");
    }

    #[test]
    fn test_header_precedence() {
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer)), "10.0.0.1");
        assert_eq!(client_ip(&headers, None), UNKNOWN_CLIENT);

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.3"));
        assert_eq!(client_ip(&headers, Some(peer)), "198.51.100.3");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.2, 10.0.0.9"),
        );
        assert_eq!(client_ip(&headers, Some(peer)), "198.51.100.2");

        headers.insert("cf-connecting-ip", HeaderValue::from_static("2001:db8:1:2:3::9"));
        assert_eq!(client_ip(&headers, Some(peer)), "2001:db8:1:2::");
    }

    #[test]
    fn test_ipv6_peer() {
        let peer: SocketAddr = "[2001:db8:a:b:c:d:e:f]:443".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(peer)), "2001:db8:a:b::");
    }
}
