//! Error page rendering with a three-tier fallback.
//!
//! ```text
//! 404 + custom page readable  → operator HTML
//! built-in template renders   → templated HTML
//! otherwise                   → {"error": "<message>"}
//! ```

use std::path::{Path, PathBuf};

use askama::Template;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::http::request::RequestMeta;
use crate::pages::status::{ProxyError, StatusTable};

const HTML_UTF8: &str = "text/html; charset=utf-8";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("template unavailable: {0}")]
    Unavailable(String),
}

/// Template-safe projection of a [`ProxyError`].
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPageContext<'a> {
    pub status_code: u16,
    pub status_desc: &'a str,
    pub status_text: &'a str,
    pub help_info: &'a str,
    pub error_message: &'a str,
}

impl<'a> From<&'a ProxyError> for ErrorPageContext<'a> {
    fn from(err: &'a ProxyError) -> Self {
        Self {
            status_code: err.status_code,
            status_desc: err.status_desc,
            status_text: err.status_text,
            help_info: err.help_info,
            error_message: &err.error_message,
        }
    }
}

/// Produces the HTML body of the templated tier.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &ErrorPageContext<'_>) -> Result<String, RenderError>;
}

/// The page compiled into the binary from `templates/error.html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplate;

impl PageRenderer for BuiltinTemplate {
    fn render(&self, page: &ErrorPageContext<'_>) -> Result<String, RenderError> {
        Ok(page.render()?)
    }
}

/// Renders [`ProxyError`]s into client responses.
pub struct ErrorPages {
    table: StatusTable,
    custom_404: Option<PathBuf>,
    renderer: Box<dyn PageRenderer>,
}

impl ErrorPages {
    /// Builds the renderer, checking the custom 404 page once.
    ///
    /// A configured page that does not exist is reported and skipped.
    pub fn new(custom_404: Option<&Path>) -> Self {
        let custom_404 = custom_404.and_then(|path| match std::fs::canonicalize(path) {
            Ok(abs) if abs.is_file() => {
                tracing::info!(path = %abs.display(), "Custom 404 page enabled");
                Some(abs)
            }
            Ok(abs) => {
                tracing::warn!(path = %abs.display(), "Custom 404 page is not a file, using built-in page");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Custom 404 page not found, using built-in page");
                None
            }
        });

        Self {
            table: StatusTable::builtin(),
            custom_404,
            renderer: Box::new(BuiltinTemplate),
        }
    }

    /// Replace the templated tier.
    pub fn with_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn has_custom_404(&self) -> bool {
        self.custom_404.is_some()
    }

    /// Look up `code` and attach the request-specific message.
    pub fn error(&self, code: u16, message: impl Into<String>) -> ProxyError {
        self.table.error(code, message)
    }

    /// Render a bare status and message.
    pub async fn render_status(&self, code: u16, message: impl Into<String>) -> Response {
        self.render(&self.error(code, message)).await
    }

    pub async fn render(&self, err: &ProxyError) -> Response {
        let status = StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.status_code == 404 {
            if let Some(path) = &self.custom_404 {
                match tokio::fs::read(path).await {
                    Ok(page) => return html(status, page),
                    Err(e) => tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read custom 404 page, using built-in page"
                    ),
                }
            }
        }

        match self.renderer.render(&ErrorPageContext::from(err)) {
            Ok(page) => html(status, page.into_bytes()),
            Err(e) => {
                tracing::debug!(error = %e, "Error page template failed, answering with JSON");
                (status, Json(serde_json::json!({ "error": err.error_message }))).into_response()
            }
        }
    }

    /// Log a missing resource and render the 404 page.
    pub async fn not_found(&self, meta: &RequestMeta, message: impl Into<String>) -> Response {
        let message = message.into();
        tracing::warn!(
            client_ip = %meta.client_ip,
            method = %meta.method,
            path = %meta.path,
            user_agent = %meta.user_agent,
            protocol = %meta.protocol,
            message = %message,
            "Not found"
        );
        self.render(&self.error(404, message)).await
    }

    /// Log a path the classifier could not map and render the 404 page.
    pub async fn invalid_url(&self, meta: &RequestMeta, path: &str) -> Response {
        self.not_found(meta, format!("Invalid URL Format. Path: {}", path)).await
    }
}

fn html(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(HTML_UTF8))],
        body,
    )
        .into_response()
}
