//! Origin link rewriting.

use std::sync::LazyLock;

use regex::bytes::{Captures, Regex};

use super::{RewriteError, Stage};

/// Hosts whose links are routed back through the proxy.
const ORIGIN_HOSTS: &[&str] = &[
    "github.com",
    "raw.githubusercontent.com",
    "gist.github.com",
    "gist.githubusercontent.com",
    "codeload.github.com",
    "objects.githubusercontent.com",
];

const API_HOST: &str = "api.github.com";

/// Longest run without a delimiter held back before it is flushed.
const MAX_CARRY: usize = 32 * 1024;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://([^\s'"<>()\[\]{}`]+)"#).expect("URL pattern is valid")
});

/// Bytes that can never be part of a matched URL.
fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'"' | b'\'' | b'<' | b'>')
}

/// Bytes that end a matched URL without separating words.
fn ends_url(byte: u8) -> bool {
    is_delimiter(byte) || matches!(byte, b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'`')
}

pub struct LinkRewriter {
    host: String,
    rewrite_api: bool,
    carry: Vec<u8>,
}

impl LinkRewriter {
    pub fn new(host: &str, rewrite_api: bool) -> Self {
        Self {
            host: host.to_string(),
            rewrite_api,
            carry: Vec::new(),
        }
    }

    fn is_origin(&self, authority: &[u8]) -> bool {
        let end = authority
            .iter()
            .position(|b| matches!(b, b'/' | b'?' | b'#' | b':'))
            .unwrap_or(authority.len());
        let host = &authority[..end];
        ORIGIN_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h.as_bytes()))
            || (self.rewrite_api && host.eq_ignore_ascii_case(API_HOST.as_bytes()))
    }

    fn transform(&self, text: &[u8]) -> Vec<u8> {
        URL_PATTERN
            .replace_all(text, |caps: &Captures<'_>| {
                let rest = &caps[1];
                if !self.is_origin(rest) {
                    return caps[0].to_vec();
                }
                let mut link = Vec::with_capacity(self.host.len() + rest.len() + 9);
                link.extend_from_slice(b"https://");
                link.extend_from_slice(self.host.as_bytes());
                link.push(b'/');
                link.extend_from_slice(rest);
                link
            })
            .into_owned()
    }
}

impl Stage for LinkRewriter {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<u8>, RewriteError> {
        self.carry.extend_from_slice(chunk);
        match self.carry.iter().rposition(|b| is_delimiter(*b)) {
            Some(cut) => {
                let tail = self.carry.split_off(cut + 1);
                let ready = std::mem::replace(&mut self.carry, tail);
                Ok(self.transform(&ready))
            }
            None if self.carry.len() > MAX_CARRY => {
                // Keep only what follows the last byte that can close a URL.
                let tail = match self.carry.iter().rposition(|b| ends_url(*b)) {
                    Some(cut) => self.carry.split_off(cut + 1),
                    None => Vec::new(),
                };
                let ready = std::mem::replace(&mut self.carry, tail);
                Ok(self.transform(&ready))
            }
            None => Ok(Vec::new()),
        }
    }

    fn finish(&mut self) -> Result<Vec<u8>, RewriteError> {
        let rest = std::mem::take(&mut self.carry);
        Ok(self.transform(&rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stage: &mut LinkRewriter, parts: &[&str]) -> String {
        let mut out = Vec::new();
        for part in parts {
            out.extend(stage.push(part.as_bytes()).unwrap());
        }
        out.extend(stage.finish().unwrap());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn rewrites_origin_links_only() {
        let mut stage = LinkRewriter::new("gh.example", false);
        let out = run(
            &mut stage,
            &["wget https://github.com/u/r/releases/download/v1/a.tgz\ncurl http://example.com/x\n"],
        );
        assert_eq!(
            out,
            "wget https://gh.example/github.com/u/r/releases/download/v1/a.tgz\ncurl http://example.com/x\n"
        );
    }

    #[test]
    fn url_split_across_chunks() {
        let mut stage = LinkRewriter::new("gh.example", false);
        let out = run(
            &mut stage,
            &["src=\"https://raw.github", "usercontent.com/u/r/main/install.sh\" done"],
        );
        assert_eq!(
            out,
            "src=\"https://gh.example/raw.githubusercontent.com/u/r/main/install.sh\" done"
        );
    }

    #[test]
    fn api_links_need_opt_in() {
        let text = "curl https://api.github.com/repos/u/r/releases/latest";

        let mut plain = LinkRewriter::new("gh.example", false);
        assert_eq!(run(&mut plain, &[text]), text);

        let mut api = LinkRewriter::new("gh.example", true);
        assert_eq!(
            run(&mut api, &[text]),
            "curl https://gh.example/api.github.com/repos/u/r/releases/latest"
        );
    }

    #[test]
    fn host_match_is_exact() {
        let mut stage = LinkRewriter::new("gh.example", false);
        let text = "see https://github.com.evil.test/u/r and https://notgithub.com/x";
        assert_eq!(run(&mut stage, &[text]), text);
    }

    #[test]
    fn held_back_bytes_are_bounded() {
        let mut stage = LinkRewriter::new("gh.example", false);
        let run_of_bytes = vec![b'a'; MAX_CARRY + 1];
        assert_eq!(stage.push(&run_of_bytes).unwrap().len(), MAX_CARRY + 1);
        assert!(stage.finish().unwrap().is_empty());
    }

    #[test]
    fn oversized_run_still_rewrites_closed_links() {
        let mut stage = LinkRewriter::new("gh.example", false);
        let padding = "x".repeat(MAX_CARRY);
        let text = format!("{padding}(https://github.com/u/r/a.sh)tail");

        let flushed = String::from_utf8(stage.push(text.as_bytes()).unwrap()).unwrap();
        assert_eq!(flushed, format!("{padding}(https://gh.example/github.com/u/r/a.sh)"));
        assert_eq!(stage.finish().unwrap(), b"tail");
    }
}
