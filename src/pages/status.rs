//! Status code metadata shown on error pages.

/// Display metadata for one recognized status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub code: u16,
    pub desc: &'static str,
    pub text: &'static str,
    pub help: &'static str,
}

const BUILTIN: &[StatusInfo] = &[
    StatusInfo {
        code: 400,
        desc: "Bad Request",
        text: "Invalid Request",
        help: "The requested URL is malformed. Please check it and try again.",
    },
    StatusInfo {
        code: 401,
        desc: "Unauthorized",
        text: "Authentication Failed",
        help: "Authorization is missing or invalid.",
    },
    StatusInfo {
        code: 403,
        desc: "Forbidden",
        text: "Access Denied",
        help: "You do not have permission to access this resource.",
    },
    StatusInfo {
        code: 404,
        desc: "Not Found",
        text: "Page Not Found",
        help: "Sorry, the page you are looking for does not exist.",
    },
    StatusInfo {
        code: 429,
        desc: "Too Many Requests",
        text: "Too Many Requests",
        help: "You are sending requests too quickly. Please try again later.",
    },
    StatusInfo {
        code: 500,
        desc: "Internal Server Error",
        text: "Internal Server Error",
        help: "The server failed to process your request. Please retry later or contact the administrator.",
    },
];

/// Immutable lookup from status code to page metadata.
#[derive(Debug, Clone)]
pub struct StatusTable {
    entries: &'static [StatusInfo],
}

impl StatusTable {
    /// The six codes the proxy renders with full metadata.
    pub fn builtin() -> Self {
        Self { entries: BUILTIN }
    }

    pub fn lookup(&self, code: u16) -> Option<&'static StatusInfo> {
        self.entries.iter().find(|info| info.code == code)
    }

    /// Build an error value for `code`, leaving the metadata empty when the
    /// code is not in the table.
    pub fn error(&self, code: u16, message: impl Into<String>) -> ProxyError {
        let info = self.lookup(code);
        ProxyError {
            status_code: code,
            status_desc: info.map_or("", |i| i.desc),
            status_text: info.map_or("", |i| i.text),
            help_info: info.map_or("", |i| i.help),
            error_message: message.into(),
        }
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A request-level failure ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyError {
    pub status_code: u16,
    pub status_desc: &'static str,
    pub status_text: &'static str,
    pub help_info: &'static str,
    pub error_message: String,
}
