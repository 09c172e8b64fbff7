use std::io;

use juneau_buffers::BufferError;
use thiserror::Error;

/// Errors raised by MessagePack encoding, decoding and value adaptation.
///
/// Every variant is terminal for the call that produced it.
#[derive(Debug, Error)]
pub enum MsgPackError {
    #[error("nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("unsupported value kind: expected {expected}, found {found}")]
    UnsupportedValueKind {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid tag byte 0x{tag:02x} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },
    #[error("truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },
    #[error("sink write failed: {0}")]
    SinkWriteFailure(#[source] io::Error),
    #[error("source read failed: {0}")]
    SourceReadFailure(#[source] io::Error),
    #[error("integer does not fit in {target}")]
    NumericOverflow { target: &'static str },
    #[error("invalid utf-8 in string payload")]
    InvalidUtf8,
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
    #[error("invalid timestamp extension")]
    InvalidTimestamp,
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("duplicate map key")]
    DuplicateKey,
    #[error("value size does not match the declared size")]
    InvalidSize,
    #[error("not a map")]
    NotMap,
    #[error("not an array")]
    NotArr,
    #[error("not a string")]
    NotStr,
    #[error("key not found")]
    KeyNotFound,
    #[error("index out of bounds")]
    IndexOutOfBounds,
}

impl From<BufferError> for MsgPackError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::EndOfBuffer { needed, available } => {
                MsgPackError::TruncatedInput { needed, available }
            }
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = MsgPackError> = std::result::Result<T, E>;
