//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path (/https://github.com/<user>/<repo>/...)
//!     → classify.rs (recover upstream URL, match host + path shape)
//!     → Return: Route { kind, target } or RouteError
//!
//! Git cache mode:
//!     Route.target
//!     → parts.rs (split /user /repo /rest ?query)
//!     → rebased onto the accelerator address
//! ```
//!
//! # Design Decisions
//! - Classification is a pure function of the path, no config involved
//! - Rewrite eligibility is decided here; whether it is enabled is config
//! - Deterministic: same input always yields the same route

pub mod classify;
pub mod parts;

pub use classify::{classify, Forwarding, Route, RouteError, RouteKind};
pub use parts::{split_repo_path, PathTooShort, RepoPath};
