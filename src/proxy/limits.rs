//! Response size policy.
//!
//! Only a `Content-Length` that parses and exceeds the limit counts as an
//! overflow. Missing or malformed lengths stream as unknown.

use axum::http::HeaderValue;

const MIB: u64 = 1024 * 1024;

/// Outcome of checking a declared response length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    /// No `Content-Length` header.
    Unknown,
    /// A `Content-Length` header that is not a non-negative integer.
    Unparseable,
    WithinLimit(u64),
    Exceeded(u64),
}

impl SizeCheck {
    /// The length to advertise to the client, if any.
    pub fn known_length(&self) -> Option<u64> {
        match self {
            SizeCheck::WithinLimit(len) => Some(*len),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimitPolicy {
    pub limit_bytes: u64,
}

impl SizeLimitPolicy {
    pub fn from_mb(size_limit_mb: u64) -> Self {
        Self {
            limit_bytes: size_limit_mb.saturating_mul(MIB),
        }
    }

    pub fn check(&self, content_length: Option<&HeaderValue>) -> SizeCheck {
        let Some(value) = content_length else {
            return SizeCheck::Unknown;
        };
        match value.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) {
            Some(len) if len > self.limit_bytes => SizeCheck::Exceeded(len),
            Some(len) => SizeCheck::WithinLimit(len),
            None => SizeCheck::Unparseable,
        }
    }
}
