//! Crate-wide error type.
//!
//! Mirrors the error kinds from the design: parse errors, connect errors,
//! I/O errors on an established stream, protocol violations, and the two
//! terminal DoT broker outcomes (retries exhausted / intake saturated).

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("connect error: {0}")]
    Connect(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("max retries exceeded")]
    Exhausted,

    #[error("DoT channel is full")]
    Saturated,
}

pub type Result<T> = std::result::Result<T, Error>;
