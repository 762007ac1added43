//! Forwarding failures and their client-facing status.

use axum::response::Response;
use thiserror::Error;

use crate::http::request::RequestMeta;
use crate::pages::ErrorPages;
use crate::proxy::rewrite::RewriteError;

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The upstream request could not be built.
    #[error("Failed to create request: {0}")]
    UpstreamRequest(String),

    /// Transport failure talking to the upstream.
    #[error("Failed to send request: {0}")]
    UpstreamDispatch(#[from] reqwest::Error),

    #[error("Page Not Found (From Github)")]
    UpstreamNotFound,

    #[error("Failed to rewrite response: {0}")]
    Rewrite(#[from] RewriteError),

    /// The path does not map to any supported upstream.
    #[error("Invalid URL Format. Path: {path}")]
    InvalidRoute { path: String },
}

impl ForwardError {
    pub fn status(&self) -> u16 {
        match self {
            ForwardError::UpstreamNotFound | ForwardError::InvalidRoute { .. } => 404,
            ForwardError::UpstreamRequest(_)
            | ForwardError::UpstreamDispatch(_)
            | ForwardError::Rewrite(_) => 500,
        }
    }

    /// Label used for the upstream error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::UpstreamRequest(_) => "request",
            ForwardError::UpstreamDispatch(_) => "dispatch",
            ForwardError::UpstreamNotFound => "not_found",
            ForwardError::Rewrite(_) => "rewrite",
            ForwardError::InvalidRoute { .. } => "invalid_route",
        }
    }
}

/// Log `err` and turn it into an error page.
pub async fn report(pages: &ErrorPages, meta: &RequestMeta, err: ForwardError) -> Response {
    metrics::counter!("proxy_upstream_errors_total", "kind" => err.kind()).increment(1);
    match err {
        ForwardError::InvalidRoute { path } => pages.invalid_url(meta, &path).await,
        ForwardError::UpstreamNotFound => pages.not_found(meta, err.to_string()).await,
        err => {
            tracing::error!(
                client_ip = %meta.client_ip,
                method = %meta.method,
                path = %meta.path,
                error = %err,
                "Upstream forwarding failed"
            );
            pages.render_status(err.status(), err.to_string()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ForwardError::UpstreamNotFound.status(), 404);
        assert_eq!(ForwardError::InvalidRoute { path: "/x".into() }.status(), 404);
        assert_eq!(ForwardError::UpstreamRequest("bad".into()).status(), 500);
        let decode = RewriteError::Decode(std::io::Error::other("corrupt"));
        assert_eq!(ForwardError::from(decode).status(), 500);
    }

    #[tokio::test]
    async fn reported_errors_keep_their_status() {
        let pages = ErrorPages::new(None);
        let meta = RequestMeta::default();

        let response = report(&pages, &meta, ForwardError::UpstreamNotFound).await;
        assert_eq!(response.status(), 404);

        let response = report(&pages, &meta, ForwardError::UpstreamRequest("bad url".into())).await;
        assert_eq!(response.status(), 500);
    }
}
