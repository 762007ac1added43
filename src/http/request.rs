//! Request metadata used for logging and link rewriting.
//!
//! # Responsibilities
//! - Resolve the client IP (forwarding headers first, then the socket peer)
//! - Capture method, path, user agent and protocol for structured logs
//! - Capture the Host the client used, for rewritten links

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request, Version};

/// Per-request fields carried into every log line of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub client_ip: String,
    pub method: String,
    pub path: String,
    pub user_agent: String,
    pub protocol: String,
    /// Authority the client addressed; used as the host of rewritten links.
    pub host: String,
}

impl RequestMeta {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let headers = request.headers();

        Self {
            client_ip: client_ip(headers, peer),
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            user_agent: header_str(headers, header::USER_AGENT.as_str()).to_string(),
            protocol: protocol_name(request.version()).to_string(),
            host: match header_str(headers, header::HOST.as_str()) {
                "" => request
                    .uri()
                    .authority()
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
                host => host.to_string(),
            },
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the TCP peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = header_str(headers, "x-forwarded-for")
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = header_str(headers, "x-real-ip").trim();
    if !real_ip.is_empty() {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn protocol_name(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP",
    }
}
