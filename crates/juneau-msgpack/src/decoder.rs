//! Reads one [`Value`] at a time from a [`Source`].
//!
//! Decoding dispatches on the leading tag byte, reads any length prefix, and
//! then either reads a scalar payload or opens a container. Open containers
//! live on a heap stack, so deep input cannot exhaust the call stack.
//! Any error aborts the whole value; nothing partial is returned.

use std::io::Read;

use crate::constants::Marker;
use crate::error::{MsgPackError, Result};
use crate::options::MsgPackOptions;
use crate::source::{IoSource, SliceSource, Source};
use crate::value::{Extension, Integer, Value};

// Upper bound on capacity reserved from a declared container count.
const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug, Clone, Default)]
pub struct MsgPackDecoder {
    options: MsgPackOptions,
}

impl MsgPackDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a decoder after validating `options`.
    pub fn with_options(options: MsgPackOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &MsgPackOptions {
        &self.options
    }

    /// Reads exactly one value from `source`, leaving any later bytes unread.
    pub fn decode_from<S: Source + ?Sized>(&self, source: &mut S) -> Result<Value> {
        let mut parser = Parser {
            source,
            max_depth: self.options.max_depth,
        };
        parser.read_any(self.options.initial_depth)
    }

    /// Decodes the first value in `input`. Trailing bytes are ignored.
    pub fn decode(&self, input: &[u8]) -> Result<Value> {
        self.decode_from(&mut SliceSource::new(input))
    }

    /// Decodes a value that must span all of `input`.
    pub fn decode_exact(&self, input: &[u8]) -> Result<Value> {
        let mut source = SliceSource::new(input);
        let value = self.decode_from(&mut source)?;
        match source.remaining() {
            Some(0) | None => Ok(value),
            Some(n) => Err(MsgPackError::TrailingBytes(n)),
        }
    }

    /// Iterates over concatenated values in `input`.
    pub fn iter<'a>(&'a self, input: &'a [u8]) -> SliceValues<'a> {
        SliceValues {
            decoder: self,
            source: SliceSource::new(input),
            done: false,
        }
    }

    /// Iterates over concatenated values read from `reader` until a clean
    /// end of stream.
    pub fn iter_stream<R: Read>(&self, reader: R) -> StreamValues<'_, R> {
        StreamValues {
            decoder: self,
            source: IoSource::new(reader),
            done: false,
        }
    }

    fn decode_tagged<S: Source + ?Sized>(&self, tag: u8, source: &mut S) -> Result<Value> {
        let mut parser = Parser {
            source,
            max_depth: self.options.max_depth,
        };
        parser.read_tagged(tag, self.options.initial_depth)
    }
}

/// Values decoded back to back from a byte slice.
pub struct SliceValues<'a> {
    decoder: &'a MsgPackDecoder,
    source: SliceSource<'a>,
    done: bool,
}

impl Iterator for SliceValues<'_> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.source.is_empty() {
            return None;
        }
        let result = self.decoder.decode_from(&mut self.source);
        self.done = result.is_err();
        Some(result)
    }
}

/// Values decoded back to back from an `io::Read` stream.
pub struct StreamValues<'a, R> {
    decoder: &'a MsgPackDecoder,
    source: IoSource<R>,
    done: bool,
}

impl<R: Read> Iterator for StreamValues<'_, R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.source.next_byte() {
            Ok(None) => {
                self.done = true;
                return None;
            }
            Ok(Some(tag)) => self.decoder.decode_tagged(tag, &mut self.source),
            Err(e) => Err(e),
        };
        self.done = result.is_err();
        Some(result)
    }
}

struct Parser<'a, S: Source + ?Sized> {
    source: &'a mut S,
    max_depth: usize,
}

/// What a tag byte and its length prefix announce.
enum Head {
    Value(Value),
    Array(usize),
    Map(usize),
}

/// A container still waiting for children.
enum Frame {
    Array {
        items: Vec<Value>,
        remaining: usize,
    },
    Map {
        entries: Vec<(Value, Value)>,
        key: Option<Value>,
        remaining: usize,
    },
}

impl Frame {
    /// Adds one decoded child and reports whether the container is complete.
    fn push(&mut self, value: Value) -> bool {
        match self {
            Frame::Array { items, remaining } => {
                items.push(value);
                *remaining -= 1;
                *remaining == 0
            }
            Frame::Map {
                entries,
                key,
                remaining,
            } => match key.take() {
                None => {
                    *key = Some(value);
                    false
                }
                Some(k) => {
                    entries.push((k, value));
                    *remaining -= 1;
                    *remaining == 0
                }
            },
        }
    }

    fn into_value(self) -> Value {
        match self {
            Frame::Array { items, .. } => Value::Array(items),
            Frame::Map { entries, .. } => Value::Map(entries),
        }
    }
}

impl<S: Source + ?Sized> Parser<'_, S> {
    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.source.read_into(&mut out)?;
        Ok(out)
    }

    #[inline]
    fn u8(&mut self) -> Result<u8> {
        self.source.read_u8()
    }

    fn u16(&mut self) -> Result<u16> {
        self.array().map(u16::from_be_bytes)
    }

    fn u32(&mut self) -> Result<u32> {
        self.array().map(u32::from_be_bytes)
    }

    fn len8(&mut self) -> Result<usize> {
        self.u8().map(usize::from)
    }

    fn len16(&mut self) -> Result<usize> {
        self.u16().map(usize::from)
    }

    fn len32(&mut self) -> Result<usize> {
        let n = self.u32()?;
        usize::try_from(n).map_err(|_| MsgPackError::NumericOverflow { target: "usize" })
    }

    fn payload(&mut self, n: usize) -> Result<Vec<u8>> {
        self.source.ensure(n)?;
        self.source.read_bytes(n)
    }

    fn read_any(&mut self, depth: usize) -> Result<Value> {
        let tag = self.u8()?;
        self.read_tagged(tag, depth)
    }

    /// Decodes the value starting with `tag`. Containers are tracked on an
    /// explicit stack, so nesting costs heap rather than call frames.
    fn read_tagged(&mut self, tag: u8, depth: usize) -> Result<Value> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut tag = tag;
        'value: loop {
            let mut value = match self.read_head(tag)? {
                Head::Value(value) => value,
                Head::Array(size) => {
                    self.enter(depth + stack.len())?;
                    // Every element takes at least one byte.
                    self.source.ensure(size)?;
                    if size == 0 {
                        Value::Array(Vec::new())
                    } else {
                        stack.push(Frame::Array {
                            items: Vec::with_capacity(size.min(PREALLOC_LIMIT)),
                            remaining: size,
                        });
                        tag = self.u8()?;
                        continue 'value;
                    }
                }
                Head::Map(size) => {
                    self.enter(depth + stack.len())?;
                    self.source.ensure(size.saturating_mul(2))?;
                    if size == 0 {
                        Value::Map(Vec::new())
                    } else {
                        stack.push(Frame::Map {
                            entries: Vec::with_capacity(size.min(PREALLOC_LIMIT)),
                            key: None,
                            remaining: size,
                        });
                        tag = self.u8()?;
                        continue 'value;
                    }
                }
            };
            while let Some(mut frame) = stack.pop() {
                if frame.push(value) {
                    value = frame.into_value();
                } else {
                    stack.push(frame);
                    tag = self.u8()?;
                    continue 'value;
                }
            }
            return Ok(value);
        }
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth + 1 > self.max_depth {
            return Err(MsgPackError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn read_head(&mut self, tag: u8) -> Result<Head> {
        let value = match Marker::from_u8(tag) {
            Marker::PositiveFixint(n) => Value::Integer(n.into()),
            Marker::NegativeFixint(n) => Value::Integer(n.into()),
            Marker::FixMap(n) => return Ok(Head::Map(n as usize)),
            Marker::FixArray(n) => return Ok(Head::Array(n as usize)),
            Marker::FixStr(n) => self.read_str(n as usize)?,
            Marker::Nil => Value::Null,
            Marker::Reserved => {
                return Err(MsgPackError::InvalidTag {
                    tag,
                    offset: self.source.position().saturating_sub(1),
                })
            }
            Marker::False => Value::Bool(false),
            Marker::True => Value::Bool(true),
            Marker::Bin8 => {
                let n = self.len8()?;
                Value::Binary(self.payload(n)?)
            }
            Marker::Bin16 => {
                let n = self.len16()?;
                Value::Binary(self.payload(n)?)
            }
            Marker::Bin32 => {
                let n = self.len32()?;
                Value::Binary(self.payload(n)?)
            }
            Marker::Ext8 => {
                let n = self.len8()?;
                self.read_ext(n)?
            }
            Marker::Ext16 => {
                let n = self.len16()?;
                self.read_ext(n)?
            }
            Marker::Ext32 => {
                let n = self.len32()?;
                self.read_ext(n)?
            }
            // float32 widens exactly into f64
            Marker::Float32 => Value::Float(f32::from_be_bytes(self.array()?) as f64),
            Marker::Float64 => Value::Float(f64::from_be_bytes(self.array()?)),
            Marker::Uint8 => Value::Integer(self.u8()?.into()),
            Marker::Uint16 => Value::Integer(self.u16()?.into()),
            Marker::Uint32 => Value::Integer(self.u32()?.into()),
            Marker::Uint64 => Value::Integer(u64::from_be_bytes(self.array()?).into()),
            Marker::Int8 => Value::Integer(i8::from_be_bytes(self.array()?).into()),
            Marker::Int16 => Value::Integer(i16::from_be_bytes(self.array()?).into()),
            Marker::Int32 => Value::Integer(i32::from_be_bytes(self.array()?).into()),
            Marker::Int64 => Value::Integer(Integer::from(i64::from_be_bytes(self.array()?))),
            Marker::FixExt1 => self.read_ext(1)?,
            Marker::FixExt2 => self.read_ext(2)?,
            Marker::FixExt4 => self.read_ext(4)?,
            Marker::FixExt8 => self.read_ext(8)?,
            Marker::FixExt16 => self.read_ext(16)?,
            Marker::Str8 => {
                let n = self.len8()?;
                self.read_str(n)?
            }
            Marker::Str16 => {
                let n = self.len16()?;
                self.read_str(n)?
            }
            Marker::Str32 => {
                let n = self.len32()?;
                self.read_str(n)?
            }
            Marker::Array16 => return self.len16().map(Head::Array),
            Marker::Array32 => return self.len32().map(Head::Array),
            Marker::Map16 => return self.len16().map(Head::Map),
            Marker::Map32 => return self.len32().map(Head::Map),
        };
        Ok(Head::Value(value))
    }

    fn read_str(&mut self, size: usize) -> Result<Value> {
        let bytes = self.payload(size)?;
        String::from_utf8(bytes)
            .map(Value::Str)
            .map_err(|_| MsgPackError::InvalidUtf8)
    }

    fn read_ext(&mut self, size: usize) -> Result<Value> {
        // type code + payload
        self.source.ensure(size.saturating_add(1))?;
        let type_code = self.u8()? as i8;
        let data = self.payload(size)?;
        Ok(Value::Extension(Extension { type_code, data }))
    }
}
