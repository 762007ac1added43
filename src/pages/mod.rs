//! Error page subsystem.
//!
//! # Data Flow
//! ```text
//! failing request
//!     → status.rs (StatusTable lookup → ProxyError)
//!     → render.rs (custom 404 → template → JSON)
//!     → response with the error's status code
//! ```
//!
//! # Design Decisions
//! - The status table is an owned value, built once at startup
//! - The custom 404 path is validated once; later read failures fall through
//! - The JSON tier has no external inputs, so a body is always produced

pub mod render;
pub mod status;

pub use render::{BuiltinTemplate, ErrorPageContext, ErrorPages, PageRenderer, RenderError};
pub use status::{ProxyError, StatusInfo, StatusTable};
