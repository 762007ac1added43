//! Upstream authorization pass-through.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::AuthConfig;

/// Promote a `token` query parameter from the client URL into an upstream
/// `Authorization: token <t>` header, replacing any client-supplied value.
pub fn apply(config: &AuthConfig, client_query: Option<&str>, headers: &mut HeaderMap) {
    if !config.pass_through {
        return;
    }
    let Some(token) = client_query.and_then(token_param) else {
        return;
    };
    match HeaderValue::from_str(&format!("token {}", token)) {
        Ok(mut value) => {
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Err(_) => tracing::warn!("Ignoring pass-through token that is not a valid header value"),
    }
}

fn token_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "token" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
