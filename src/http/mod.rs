//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (client IP, method, path, host for logs and links)
//!     → routing::classify (upstream URL and route kind)
//!     → proxy::forward / proxy::git (upstream exchange)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::RequestMeta;
pub use server::{AppState, HttpServer};
