//! Route classification.
//!
//! # Responsibilities
//! - Recover the upstream URL embedded in the request path
//! - Match host and path shape against the supported origin routes
//! - Decide generic vs. Git forwarding and rewrite eligibility
//!
//! # Design Decisions
//! - Missing scheme defaults to https; `https:/` (collapsed slash) is repaired
//! - Blob links are served from their raw counterpart
//! - Unknown hosts are rejected, the proxy never acts as an open relay

use thiserror::Error;
use url::Url;

/// Which origin surface a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// `github.com/<u>/<r>/releases/...` and `/archive/...`
    Releases,
    /// `github.com/<u>/<r>/blob/...` or `/raw/...`
    Blob,
    /// `raw.githubusercontent.com/<u>/<r>/...`
    Raw,
    /// `gist.github.com/<u>/...` and `gist.githubusercontent.com/<u>/...`
    Gist,
    /// `api.github.com/repos/<u>/...` and `/users/<u>/...`
    Api,
    /// Git Smart HTTP: `info/refs`, `git-upload-pack`, `git-receive-pack`
    GitClone,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Releases => "releases",
            RouteKind::Blob => "blob",
            RouteKind::Raw => "raw",
            RouteKind::Gist => "gist",
            RouteKind::Api => "api",
            RouteKind::GitClone => "git",
        }
    }
}

/// Which forwarder handles a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarding {
    Generic,
    Git,
}

/// A classified request: what it is and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: RouteKind,
    pub target: Url,
}

impl Route {
    pub fn new(kind: RouteKind, target: Url) -> Self {
        Self { kind, target }
    }

    pub fn forwarding(&self) -> Forwarding {
        match self.kind {
            RouteKind::GitClone => Forwarding::Git,
            _ => Forwarding::Generic,
        }
    }

    /// Shell scripts served as file content are eligible for link rewriting.
    pub fn browsable(&self) -> bool {
        matches!(self.kind, RouteKind::Blob | RouteKind::Raw | RouteKind::Gist)
            && self.target.path().ends_with(".sh")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("path does not contain a URL")]
    Empty,
    #[error("malformed upstream URL: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("host '{0}' is not proxied")]
    UnsupportedHost(String),
    #[error("path does not match a proxied route")]
    UnsupportedPath,
}

/// Classify a request's path and query.
pub fn classify(path_and_query: &str) -> Result<Route, RouteError> {
    let raw = path_and_query.trim_start_matches('/');
    if raw.is_empty() {
        return Err(RouteError::Empty);
    }

    let mut target = Url::parse(&with_scheme(raw))?;
    let host = target.host_str().unwrap_or_default().to_ascii_lowercase();
    let segments: Vec<String> = target
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();
    let seg = |i: usize| segments.get(i).map(String::as_str);

    let kind = match host.as_str() {
        "github.com" | "www.github.com" => {
            if seg(0).is_none() || seg(1).is_none() {
                return Err(RouteError::UnsupportedPath);
            }
            match (seg(2), seg(3)) {
                (Some("releases" | "archive"), _) => RouteKind::Releases,
                (Some("blob"), Some(_)) => {
                    to_raw(&mut target, &segments);
                    RouteKind::Blob
                }
                (Some("raw"), Some(_)) => RouteKind::Blob,
                (Some("info"), Some("refs"))
                | (Some("git-upload-pack" | "git-receive-pack"), _) => RouteKind::GitClone,
                _ => return Err(RouteError::UnsupportedPath),
            }
        }
        "raw.githubusercontent.com" if segments.len() >= 3 => RouteKind::Raw,
        "gist.github.com" | "gist.githubusercontent.com" if segments.len() >= 2 => RouteKind::Gist,
        "api.github.com" if matches!(seg(0), Some("repos" | "users")) && seg(1).is_some() => {
            RouteKind::Api
        }
        "raw.githubusercontent.com"
        | "gist.github.com"
        | "gist.githubusercontent.com"
        | "api.github.com" => return Err(RouteError::UnsupportedPath),
        other => return Err(RouteError::UnsupportedHost(other.to_string())),
    };

    Ok(Route::new(kind, target))
}

/// Normalize `github.com/...`, `https:/github.com/...` and friends.
fn with_scheme(raw: &str) -> String {
    for scheme in ["https:", "http:"] {
        if let Some(rest) = raw.strip_prefix(scheme) {
            return format!("{}//{}", scheme, rest.trim_start_matches('/'));
        }
    }
    format!("https://{}", raw)
}

fn to_raw(target: &mut Url, segments: &[String]) {
    let mut path = String::new();
    for (i, seg) in segments.iter().enumerate() {
        path.push('/');
        path.push_str(if i == 2 { "raw" } else { seg });
    }
    target.set_path(&path);
}
