//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (size limit > 0, addresses parse)
//! - Check that cache mode points at a usable accelerator
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GitCloneMode, ProxyConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a socket address")]
    BindAddress(String),
    #[error("server.size_limit_mb must be greater than zero")]
    ZeroSizeLimit,
    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("server.cors '{0}' is not a valid header value")]
    Cors(String),
    #[error("git_clone.smart_git_addr '{0}' must be an http(s) URL with a host")]
    Accelerator(String),
    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }
    if config.server.size_limit_mb == 0 {
        errors.push(ValidationError::ZeroSizeLimit);
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if axum::http::HeaderValue::from_str(&config.server.cors).is_err() {
        errors.push(ValidationError::Cors(config.server.cors.clone()));
    }

    if config.git_clone.mode == GitCloneMode::Cache {
        let addr = &config.git_clone.smart_git_addr;
        if !matches!(addr.scheme(), "http" | "https") || addr.host_str().is_none() {
            errors.push(ValidationError::Accelerator(addr.to_string()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
