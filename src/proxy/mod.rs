//! Protocol-aware forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! Route (from routing::classify)
//!     → forward.rs (generic) or git.rs (Git Smart HTTP)
//!     → headers.rs (outbound sanitizing, auth.rs hook)
//!     → upstream dispatch (reqwest)
//!     → 404 short-circuit, limits.rs size check (301 on overflow)
//!     → headers.rs (inbound sanitizing, CORS)
//!     → body: verbatim stream or rewrite/ pipeline
//! ```
//!
//! Failures become [`ForwardError`] and are rendered by `pages`.

pub mod auth;
pub mod error;
pub mod forward;
pub mod git;
pub mod headers;
pub mod limits;
pub mod rewrite;

pub use error::ForwardError;
pub use forward::ForwardContext;
pub use git::RouteMode;
pub use limits::{SizeCheck, SizeLimitPolicy};
