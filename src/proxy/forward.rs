//! Generic forwarder for releases, raw files, gists and API traffic.
//!
//! The Git forwarder reuses [`deliver`] with its own header rules and
//! target; only target resolution and cache headers differ.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use url::Url;

use crate::config::ProxyConfig;
use crate::http::request::RequestMeta;
use crate::pages::ErrorPages;
use crate::proxy::error::{report, ForwardError};
use crate::proxy::headers::{self, HeaderRules, GENERIC};
use crate::proxy::limits::{SizeCheck, SizeLimitPolicy};
use crate::proxy::{auth, rewrite};
use crate::routing::Route;

/// Everything a forwarder borrows for one request.
pub struct ForwardContext<'a> {
    pub client: &'a reqwest::Client,
    pub config: &'a ProxyConfig,
    pub pages: &'a ErrorPages,
    pub meta: &'a RequestMeta,
}

/// How one upstream exchange is carried out.
pub(crate) struct Delivery {
    pub rules: &'static HeaderRules,
    pub target: Url,
    /// Run the body through the link rewriter.
    pub rewrite: bool,
    /// Forbid downstream caching of the response.
    pub no_store: bool,
}

pub async fn forward(ctx: &ForwardContext<'_>, request: Request<Body>, route: &Route) -> Response {
    let delivery = Delivery {
        rules: &GENERIC,
        target: route.target.clone(),
        rewrite: route.browsable() && ctx.config.shell.editor && request.method() != Method::HEAD,
        no_store: false,
    };
    match deliver(ctx, request, delivery).await {
        Ok(response) => response,
        Err(err) => report(ctx.pages, ctx.meta, err).await,
    }
}

pub(crate) async fn deliver(
    ctx: &ForwardContext<'_>,
    request: Request<Body>,
    delivery: Delivery,
) -> Result<Response, ForwardError> {
    let (parts, body) = request.into_parts();

    let upstream_request = build_request(ctx, &parts, body, &delivery)?;
    let upstream = ctx.client.execute(upstream_request).await?;

    if upstream.status() == StatusCode::NOT_FOUND {
        return Err(ForwardError::UpstreamNotFound);
    }

    let check = SizeLimitPolicy::from_mb(ctx.config.server.size_limit_mb)
        .check(upstream.headers().get(header::CONTENT_LENGTH));
    match check {
        SizeCheck::Exceeded(size) => return Ok(size_redirect(ctx.meta, &upstream, size)),
        SizeCheck::Unparseable => tracing::warn!(
            path = %ctx.meta.path,
            content_length = ?upstream.headers().get(header::CONTENT_LENGTH),
            "Unparseable Content-Length, streaming with unknown length"
        ),
        SizeCheck::Unknown | SizeCheck::WithinLimit(_) => {}
    }

    let status = upstream.status();
    let mut headers = headers::inbound(delivery.rules, upstream.headers(), &parts.headers);
    headers::apply_cors(&mut headers, &ctx.config.server.cors);
    if delivery.no_store {
        headers::disable_caching(&mut headers);
    }

    let body = if delivery.rewrite && carries_body(status) {
        rewritten_body(ctx, upstream, &mut headers).await?
    } else {
        if let Some(len) = check.known_length() {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        }
        Body::from_stream(upstream.bytes_stream())
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn build_request(
    ctx: &ForwardContext<'_>,
    parts: &axum::http::request::Parts,
    body: Body,
    delivery: &Delivery,
) -> Result<reqwest::Request, ForwardError> {
    let mut headers = headers::outbound(delivery.rules, &parts.headers, delivery.target.path());
    if delivery.rewrite {
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    }
    auth::apply(&ctx.config.auth, parts.uri.query(), &mut headers);

    let mut builder = ctx
        .client
        .request(parts.method.clone(), delivery.target.clone())
        .headers(headers);
    if declares_body(&parts.headers) {
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }
    builder
        .build()
        .map_err(|e| ForwardError::UpstreamRequest(e.to_string()))
}

/// A request carries a body when it says so through its framing headers.
fn declares_body(headers: &HeaderMap) -> bool {
    let sized = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .is_some_and(|len| len > 0);
    sized || headers.contains_key(header::TRANSFER_ENCODING)
}

/// Statuses whose responses never have a body.
fn carries_body(status: StatusCode) -> bool {
    !(status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED)
}

fn size_redirect(meta: &RequestMeta, upstream: &reqwest::Response, size: u64) -> Response {
    let location = upstream.url().as_str();
    tracing::warn!(
        client_ip = %meta.client_ip,
        method = %meta.method,
        path = %meta.path,
        user_agent = %meta.user_agent,
        protocol = %meta.protocol,
        final_url = %location,
        size,
        "Response exceeds size limit, redirecting to origin"
    );
    metrics::counter!("proxy_size_limit_redirects_total").increment(1);
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location.to_string())]).into_response()
}

/// Rewrite the upstream body. The first chunk is pulled before the response
/// is committed; an error there is returned instead of a body.
async fn rewritten_body(
    ctx: &ForwardContext<'_>,
    upstream: reqwest::Response,
    headers: &mut HeaderMap,
) -> Result<Body, ForwardError> {
    let gzip = upstream
        .headers()
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"));
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::CONTENT_ENCODING);

    let mut output = rewrite::rewrite(upstream.bytes_stream(), gzip, &ctx.meta.host, &ctx.config.shell);
    let first = output.next().await.transpose()?;
    tracing::trace!(path = %ctx.meta.path, gzip, "Rewriting response links");

    let path = ctx.meta.path.clone();
    let body = stream::iter(first.map(Ok))
        .chain(output)
        .inspect_err(move |e| {
            tracing::error!(path = %path, error = %e, "Rewrite failed mid-stream, aborting response")
        });
    Ok(Body::from_stream(body))
}
