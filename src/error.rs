//! Session-level error type. The original C++ program reported failures
//! by printing to stdout and continuing (or, for the handshake, spinning
//! forever); a library can't do either, so failures here are typed and
//! returned.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("handshake did not complete within {0} attempts")]
    HandshakeTimeout(u32),

    #[error("physical channel error: {0}")]
    Io(#[from] io::Error),
}
