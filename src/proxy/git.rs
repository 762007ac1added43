//! Git Smart HTTP forwarder.
//!
//! Bypass and cache mode run the same exchange; [`RouteMode::resolve`] is
//! the only difference. Git bodies are never rewritten.

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use url::Url;

use crate::config::{GitCloneConfig, GitCloneMode};
use crate::proxy::error::{report, ForwardError};
use crate::proxy::forward::{deliver, Delivery, ForwardContext};
use crate::proxy::headers::GIT;
use crate::routing::{split_repo_path, Route};

/// Where Git traffic is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode<'a> {
    Bypass,
    Cache { accelerator: &'a Url },
}

impl<'a> RouteMode<'a> {
    pub fn from_config(config: &'a GitCloneConfig) -> Self {
        match config.mode {
            GitCloneMode::Bypass => RouteMode::Bypass,
            GitCloneMode::Cache => RouteMode::Cache {
                accelerator: &config.smart_git_addr,
            },
        }
    }

    /// The URL the request is actually sent to.
    pub fn resolve(&self, target: &Url) -> Result<Url, ForwardError> {
        match self {
            RouteMode::Bypass => Ok(target.clone()),
            RouteMode::Cache { accelerator } => split_repo_path(target)
                .map_err(|e| ForwardError::UpstreamRequest(e.to_string()))?
                .rebase(accelerator)
                .map_err(|e| ForwardError::UpstreamRequest(e.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RouteMode::Bypass => "bypass",
            RouteMode::Cache { .. } => "cache",
        }
    }
}

pub async fn forward(ctx: &ForwardContext<'_>, request: Request<Body>, route: &Route) -> Response {
    let mode = RouteMode::from_config(&ctx.config.git_clone);
    match forward_with(ctx, request, route, mode).await {
        Ok(response) => response,
        Err(err) => report(ctx.pages, ctx.meta, err).await,
    }
}

async fn forward_with(
    ctx: &ForwardContext<'_>,
    request: Request<Body>,
    route: &Route,
    mode: RouteMode<'_>,
) -> Result<Response, ForwardError> {
    let target = mode.resolve(&route.target)?;
    tracing::debug!(
        mode = mode.name(),
        target = %target,
        git_protocol = ?request.headers().get("git-protocol"),
        "Forwarding Git request"
    );

    let delivery = Delivery {
        rules: &GIT,
        target,
        rewrite: false,
        no_store: matches!(mode, RouteMode::Cache { .. }),
    };
    deliver(ctx, request, delivery).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn bypass_keeps_target() {
        let target = url("https://github.com/u/r/info/refs?service=git-upload-pack");
        assert_eq!(RouteMode::Bypass.resolve(&target).unwrap(), target);
    }

    #[test]
    fn cache_rebases_onto_accelerator() {
        let accelerator = url("http://127.0.0.1:9000");
        let mode = RouteMode::Cache { accelerator: &accelerator };

        let resolved = mode
            .resolve(&url("https://github.com/u/r/info/refs?service=git-upload-pack"))
            .unwrap();
        assert_eq!(
            resolved.as_str(),
            "http://127.0.0.1:9000/u/r/info/refs?service=git-upload-pack"
        );

        let resolved = mode.resolve(&url("https://github.com/u/r.git/git-upload-pack")).unwrap();
        assert_eq!(resolved.as_str(), "http://127.0.0.1:9000/u/r.git/git-upload-pack");
    }

    #[test]
    fn cache_rejects_unsplittable_paths() {
        let accelerator = url("http://127.0.0.1:9000");
        let mode = RouteMode::Cache { accelerator: &accelerator };
        let err = mode.resolve(&url("https://github.com/u")).unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn mode_follows_config() {
        let mut config = GitCloneConfig::default();
        assert_eq!(RouteMode::from_config(&config), RouteMode::Bypass);

        config.mode = GitCloneMode::Cache;
        assert_eq!(
            RouteMode::from_config(&config),
            RouteMode::Cache { accelerator: &config.smart_git_addr }
        );
    }
}
