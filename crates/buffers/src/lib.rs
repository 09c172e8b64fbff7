//! Byte buffers shared by the binary codecs.
//!
//! - [`Writer`] is an auto-growing output buffer that doubles as an
//!   in-memory `std::io::Write` sink.
//! - [`Reader`] is a bounds-checked cursor over a borrowed byte slice.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised by buffer cursors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("end of buffer: needed {needed} bytes, {available} available")]
    EndOfBuffer { needed: usize, available: usize },
}
