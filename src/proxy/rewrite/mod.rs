//! Streaming body rewriting.
//!
//! # Data Flow
//! ```text
//! upstream bytes
//!     → gzip.rs (optional: incremental gunzip)
//!     → links.rs (origin links → proxy links)
//!     → client body, uncompressed, unknown length
//! ```
//!
//! Each step is a [`Stage`] turned into a stream adapter by [`adapt`], so
//! stages compose without materializing the document.

pub mod gzip;
pub mod links;

use axum::body::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use thiserror::Error;

use crate::config::ShellConfig;

pub use gzip::Gunzip;
pub use links::LinkRewriter;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to read upstream body: {0}")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to decompress upstream body: {0}")]
    Decode(#[source] std::io::Error),
}

/// One incremental transformation step.
pub trait Stage: Send + 'static {
    /// Transform the next input chunk. May return an empty buffer while
    /// waiting for more input.
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<u8>, RewriteError>;

    /// Flush whatever is held back once the input has ended.
    fn finish(&mut self) -> Result<Vec<u8>, RewriteError>;
}

/// Run `input` through `stage`. The stream ends after the first error.
pub fn adapt<St, S>(input: St, stage: S) -> BoxStream<'static, Result<Bytes, RewriteError>>
where
    St: Stream<Item = Result<Bytes, RewriteError>> + Send + 'static,
    S: Stage,
{
    stream::unfold(Some((input.boxed(), stage)), |state| async move {
        let (mut input, mut stage) = state?;
        loop {
            let step = match input.next().await {
                Some(Ok(chunk)) => match stage.push(&chunk) {
                    Ok(out) if out.is_empty() => continue,
                    Ok(out) => Ok(out),
                    Err(e) => Err(e),
                },
                Some(Err(e)) => Err(e),
                None => {
                    return match stage.finish() {
                        Ok(out) if out.is_empty() => None,
                        Ok(out) => Some((Ok(Bytes::from(out)), None)),
                        Err(e) => Some((Err(e), None)),
                    };
                }
            };
            return match step {
                Ok(out) => Some((Ok(Bytes::from(out)), Some((input, stage)))),
                Err(e) => Some((Err(e), None)),
            };
        }
    })
    .boxed()
}

/// Rewrite a response body so origin links point back through `host`.
pub fn rewrite<St, E>(
    body: St,
    gzip: bool,
    host: &str,
    shell: &ShellConfig,
) -> BoxStream<'static, Result<Bytes, RewriteError>>
where
    St: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let input = body.map(|chunk| chunk.map_err(|e| RewriteError::Read(Box::new(e))));
    let links = LinkRewriter::new(host, shell.rewrite_api);
    if gzip {
        adapt(adapt(input, Gunzip::new()), links)
    } else {
        adapt(input, links)
    }
}
