//! Incremental gzip decoding.

use std::io::Write;

use flate2::write::GzDecoder;

use super::{RewriteError, Stage};

/// Decompresses a gzip member as it arrives. Output is never recompressed.
pub struct Gunzip {
    decoder: GzDecoder<Vec<u8>>,
    seen_input: bool,
}

impl Gunzip {
    pub fn new() -> Self {
        Self {
            decoder: GzDecoder::new(Vec::new()),
            seen_input: false,
        }
    }

    fn drain(&mut self) -> Vec<u8> {
        std::mem::take(self.decoder.get_mut())
    }
}

impl Default for Gunzip {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Gunzip {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<u8>, RewriteError> {
        self.seen_input |= !chunk.is_empty();
        self.decoder.write_all(chunk).map_err(RewriteError::Decode)?;
        Ok(self.drain())
    }

    /// An empty body decodes to nothing.
    fn finish(&mut self) -> Result<Vec<u8>, RewriteError> {
        if !self.seen_input {
            return Ok(Vec::new());
        }
        self.decoder.try_finish().map_err(RewriteError::Decode)?;
        Ok(self.drain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    #[test]
    fn decodes_byte_by_byte() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(b"echo hello\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut stage = Gunzip::new();
        let mut out = Vec::new();
        for byte in &compressed {
            out.extend(stage.push(std::slice::from_ref(byte)).unwrap());
        }
        out.extend(stage.finish().unwrap());
        assert_eq!(out, b"echo hello\n");
    }

    #[test]
    fn empty_body_finishes_cleanly() {
        let mut stage = Gunzip::new();
        assert!(stage.push(b"").unwrap().is_empty());
        assert!(stage.finish().unwrap().is_empty());
    }

    #[test]
    fn truncated_member_is_rejected() {
        let compressed = {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(b"echo truncated\n").unwrap();
            encoder.finish().unwrap()
        };
        let mut stage = Gunzip::new();
        stage.push(&compressed[..compressed.len() - 8]).unwrap();
        assert!(matches!(stage.finish(), Err(RewriteError::Decode(_))));
    }

    #[test]
    fn bad_header_is_rejected() {
        let mut stage = Gunzip::new();
        assert!(matches!(stage.push(b"plain text body"), Err(RewriteError::Decode(_))));
    }
}
