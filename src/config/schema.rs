//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener and traffic policy.
    pub server: ServerConfig,

    /// Git Smart HTTP forwarding mode.
    pub git_clone: GitCloneConfig,

    /// In-flight link rewriting for shell scripts.
    pub shell: ShellConfig,

    /// Error page overrides.
    pub pages: PagesConfig,

    /// Upstream authorization pass-through.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener and traffic policy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest upstream response proxied, in MiB. Bigger payloads are
    /// answered with a redirect to the origin.
    pub size_limit_mb: u64,

    /// `Access-Control-Allow-Origin` policy: `*`/empty for any origin,
    /// `nil` for an empty value, anything else literally.
    pub cors: String,

    /// Time allowed until response headers are ready, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            size_limit_mb: 1024,
            cors: "*".to_string(),
            request_timeout_secs: 300,
        }
    }
}

/// How Git Smart HTTP traffic reaches the origin.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GitCloneMode {
    /// Forward straight to the origin host.
    #[default]
    Bypass,
    /// Forward to the caching accelerator at `smart_git_addr`.
    Cache,
}

/// Git clone configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GitCloneConfig {
    pub mode: GitCloneMode,

    /// Base URL of the accelerator used in cache mode.
    pub smart_git_addr: Url,
}

impl Default for GitCloneConfig {
    fn default() -> Self {
        Self {
            mode: GitCloneMode::Bypass,
            smart_git_addr: Url::parse("http://127.0.0.1:8080").expect("static URL is valid"),
        }
    }
}

/// Link rewriting for scripts served through blob/raw/gist routes.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Rewrite origin links inside `.sh` responses.
    pub editor: bool,

    /// Also rewrite links to `api.github.com`.
    pub rewrite_api: bool,
}

/// Error page configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct PagesConfig {
    /// Operator-supplied HTML served instead of the built-in 404 page.
    pub custom_404: Option<String>,
}

/// Upstream authorization handling.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Turn a `token` query parameter into an upstream `Authorization` header.
    pub pass_through: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config, ProxyConfig::default());
        assert_eq!(config.server.size_limit_mb, 1024);
        assert_eq!(config.git_clone.mode, GitCloneMode::Bypass);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [server]
            size_limit_mb = 5

            [git_clone]
            mode = "cache"
            smart_git_addr = "http://10.0.0.2:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.size_limit_mb, 5);
        assert_eq!(config.server.cors, "*");
        assert_eq!(config.git_clone.mode, GitCloneMode::Cache);
        assert_eq!(config.git_clone.smart_git_addr.as_str(), "http://10.0.0.2:9000/");
    }

    #[test]
    fn defaults_survive_serialization() {
        let rendered = toml::to_string(&ProxyConfig::default()).unwrap();
        let parsed: ProxyConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, ProxyConfig::default());
    }
}
