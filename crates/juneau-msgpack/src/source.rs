//! Byte sources the decoder reads from.
//!
//! A source hands out exactly the number of bytes requested; a short read is
//! [`MsgPackError::TruncatedInput`], never a partial success.

use std::io::{self, Read};

use juneau_buffers::Reader;

use crate::error::{MsgPackError, Result};

// Chunk used to grow payload buffers from unbounded streams.
const STREAM_CHUNK: usize = 64 * 1024;

pub trait Source {
    /// Fills `buf` completely.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Reads exactly `n` bytes into a new vector.
    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Bytes left, when the source knows its own length.
    fn remaining(&self) -> Option<usize>;

    /// Bytes consumed so far.
    fn position(&self) -> usize;

    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Fails fast when a bounded source cannot hold `n` more bytes.
    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        match self.remaining() {
            Some(available) if n > available => Err(MsgPackError::TruncatedInput {
                needed: n,
                available,
            }),
            _ => Ok(()),
        }
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_into(buf)
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(n)
    }

    fn remaining(&self) -> Option<usize> {
        (**self).remaining()
    }

    fn position(&self) -> usize {
        (**self).position()
    }
}

/// Bounded source over an in-memory slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    reader: Reader<'a>,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(data),
        }
    }

    /// Starts reading at `offset`.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            reader: Reader::from_slice(data, offset, data.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reader.size() == 0
    }

    /// Borrows the next `n` bytes without copying.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        Ok(self.reader.buf(n)?)
    }
}

impl Source for SliceSource<'_> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        Ok(self.reader.copy_to(buf)?)
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.reader.buf(n)?.to_vec())
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.reader.size())
    }

    fn position(&self) -> usize {
        self.reader.x
    }
}

/// Unbounded source over any `io::Read`.
///
/// Reads block according to the underlying reader. End of stream in the
/// middle of a value is reported as `TruncatedInput`.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    position: usize,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Checks for a clean end of stream.
    ///
    /// Returns `None` at end of stream. Otherwise the check consumes one byte
    /// and returns it; the caller must treat it as the next byte of input.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(MsgPackError::SourceReadFailure(e)),
            }
        }
    }
}

impl<R: Read> Source for IoSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        // Counts partial progress so error offsets stay exact.
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(MsgPackError::TruncatedInput {
                        needed: buf.len(),
                        available: filled,
                    })
                }
                Ok(got) => {
                    filled += got;
                    self.position += got;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(MsgPackError::SourceReadFailure(e)),
            }
        }
        Ok(())
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        // Grow with the data actually received rather than trusting `n`.
        let mut out = Vec::with_capacity(n.min(STREAM_CHUNK));
        let mut chunk = [0u8; 4096];
        while out.len() < n {
            let want = (n - out.len()).min(chunk.len());
            match self.inner.read(&mut chunk[..want]) {
                Ok(0) => {
                    return Err(MsgPackError::TruncatedInput {
                        needed: n,
                        available: out.len(),
                    })
                }
                Ok(got) => {
                    out.extend_from_slice(&chunk[..got]);
                    self.position += got;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(MsgPackError::SourceReadFailure(e)),
            }
        }
        Ok(out)
    }

    fn remaining(&self) -> Option<usize> {
        None
    }

    fn position(&self) -> usize {
        self.position
    }
}
