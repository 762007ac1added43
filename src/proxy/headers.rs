//! Header sanitization in both directions.
//!
//! Removal sets are data ([`HeaderRules`]), one value per protocol, so the
//! generic and Git behaviour can be compared and tested side by side.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Headers that identify the CDN edge the client came through.
const CDN_HEADERS: &[&str] = &[
    "cf-ipcountry",
    "cf-ray",
    "cf-visitor",
    "cf-connecting-ip",
    "cf-ew-via",
    "cdn-loop",
];

/// Headers owned by the connection, never copied from the client.
const OUTBOUND_FRAMING: &[&str] = &["host", "transfer-encoding"];

/// Headers re-derived by the proxy for the client response.
const INBOUND_FRAMING: &[&str] = &["transfer-encoding", "content-length"];

const GIT_ENDPOINTS: &[&str] = &["/git-upload-pack", "/git-receive-pack"];

/// When [`HeaderRules::preserve`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreserveScope {
    /// Only for requests to `git-upload-pack` / `git-receive-pack`.
    GitEndpoints,
    /// For every request.
    Always,
}

/// Which headers cross the proxy, per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRules {
    /// Dropped from the client request.
    pub outbound_strip: &'static [&'static str],
    /// Dropped from the upstream response.
    pub inbound_strip: &'static [&'static str],
    /// Copied verbatim from the client request even if stripped above.
    pub preserve: &'static [&'static str],
    pub preserve_scope: PreserveScope,
    /// Copied from the client request onto the client response.
    pub mirror_to_response: &'static [&'static str],
}

/// Raw files, releases, gists and API traffic.
pub const GENERIC: HeaderRules = HeaderRules {
    outbound_strip: CDN_HEADERS,
    inbound_strip: &[
        "content-security-policy",
        "referrer-policy",
        "strict-transport-security",
        "x-github-request-id",
        "x-timer",
        "x-served-by",
        "x-fastly-request-id",
    ],
    preserve: &["upgrade", "connection"],
    preserve_scope: PreserveScope::GitEndpoints,
    mirror_to_response: &[],
};

/// Git Smart HTTP. Only the policy headers are removed on the way back.
pub const GIT: HeaderRules = HeaderRules {
    outbound_strip: CDN_HEADERS,
    inbound_strip: &[
        "content-security-policy",
        "referrer-policy",
        "strict-transport-security",
    ],
    preserve: &["git-protocol", "upgrade", "connection"],
    preserve_scope: PreserveScope::Always,
    mirror_to_response: &["git-protocol"],
};

pub fn is_git_endpoint(path: &str) -> bool {
    GIT_ENDPOINTS.iter().any(|endpoint| path.contains(endpoint))
}

fn listed(list: &[&str], name: &HeaderName) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(name.as_str()))
}

/// Client request headers as they should reach the upstream.
pub fn outbound(rules: &HeaderRules, client: &HeaderMap, target_path: &str) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(client.len());
    for (name, value) in client {
        if listed(OUTBOUND_FRAMING, name) || listed(rules.outbound_strip, name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let preserve = match rules.preserve_scope {
        PreserveScope::Always => true,
        PreserveScope::GitEndpoints => is_git_endpoint(target_path),
    };
    if preserve {
        copy_named(rules.preserve, client, &mut headers);
    }
    headers
}

/// Upstream response headers as they should reach the client.
pub fn inbound(rules: &HeaderRules, upstream: &HeaderMap, client: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if listed(INBOUND_FRAMING, name) || listed(rules.inbound_strip, name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    copy_named(rules.mirror_to_response, client, &mut headers);
    headers
}

/// Replace `names` in `dst` with their values from `src`, when present.
fn copy_named(names: &[&'static str], src: &HeaderMap, dst: &mut HeaderMap) {
    for &name in names {
        let name = HeaderName::from_static(name);
        let mut values = src.get_all(&name).iter().peekable();
        if values.peek().is_none() {
            continue;
        }
        let values: Vec<HeaderValue> = values.cloned().collect();
        dst.remove(&name);
        for value in values {
            dst.append(name.clone(), value);
        }
    }
}

/// Set `Access-Control-Allow-Origin` from the configured policy.
pub fn apply_cors(headers: &mut HeaderMap, policy: &str) {
    let value = match policy {
        "" | "*" => HeaderValue::from_static("*"),
        "nil" => HeaderValue::from_static(""),
        origin => HeaderValue::from_str(origin).unwrap_or_else(|_| {
            tracing::warn!(cors = %origin, "CORS policy is not a valid header value, allowing any origin");
            HeaderValue::from_static("*")
        }),
    };
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
}

/// Keep browsers and intermediaries from caching accelerator responses.
pub fn disable_caching(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}
