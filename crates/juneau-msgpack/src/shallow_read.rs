//! Shallow navigation over encoded MessagePack.
//!
//! [`ShallowReader`] walks headers and skips whole values without building a
//! [`Value`] tree, so a single nested field can be pulled out of a large
//! document cheaply.

use juneau_buffers::Reader;

use crate::constants::{Marker, DEFAULT_MAX_DEPTH};
use crate::decoder::MsgPackDecoder;
use crate::error::{MsgPackError, Result};
use crate::source::{SliceSource, Source};
use crate::value::Value;

/// One step of a path into nested maps and arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

pub struct ShallowReader<'a> {
    reader: Reader<'a>,
    max_depth: usize,
}

impl<'a> ShallowReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::at(data, 0)
    }

    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            reader: Reader::from_slice(data, offset, data.len()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Current byte offset into the input.
    pub fn position(&self) -> usize {
        self.reader.x
    }

    /// Checks that `data[offset..offset + size]` holds exactly one value.
    pub fn validate(data: &'a [u8], offset: usize, size: usize) -> Result<()> {
        let end = offset.checked_add(size).ok_or(MsgPackError::InvalidSize)?;
        if end > data.len() {
            return Err(MsgPackError::InvalidSize);
        }
        let mut shallow = ShallowReader {
            reader: Reader::from_slice(data, offset, end),
            max_depth: DEFAULT_MAX_DEPTH,
        };
        let consumed = shallow.skip_any()?;
        if consumed != size {
            return Err(MsgPackError::InvalidSize);
        }
        Ok(())
    }

    /// Skips the next value and returns how many bytes it spanned.
    pub fn skip_any(&mut self) -> Result<usize> {
        let start = self.reader.x;
        // Children still owed by each open container.
        let mut pending: Vec<usize> = Vec::new();
        loop {
            if let Some(children) = self.skip_head()? {
                if pending.len() >= self.max_depth {
                    return Err(MsgPackError::DepthExceeded {
                        limit: self.max_depth,
                    });
                }
                if children > 0 {
                    pending.push(children);
                    continue;
                }
            }
            loop {
                match pending.last_mut() {
                    None => return Ok(self.reader.x - start),
                    Some(left) => {
                        *left -= 1;
                        if *left > 0 {
                            break;
                        }
                    }
                }
                pending.pop();
            }
        }
    }

    fn skip(&mut self, n: usize) -> Result<Option<usize>> {
        self.reader.skip(n)?;
        Ok(None)
    }

    /// Skips a tag and any scalar payload. For a container, returns how many
    /// child values follow.
    fn skip_head(&mut self) -> Result<Option<usize>> {
        let offset = self.reader.x;
        let tag = self.reader.u8()?;
        match Marker::from_u8(tag) {
            Marker::PositiveFixint(_)
            | Marker::NegativeFixint(_)
            | Marker::Nil
            | Marker::False
            | Marker::True => Ok(None),
            Marker::Reserved => Err(MsgPackError::InvalidTag { tag, offset }),
            Marker::FixMap(n) => Ok(Some(n as usize * 2)),
            Marker::FixArray(n) => Ok(Some(n as usize)),
            Marker::FixStr(n) => self.skip(n as usize),
            Marker::Bin8 | Marker::Str8 => {
                let n = self.reader.u8()? as usize;
                self.skip(n)
            }
            Marker::Bin16 | Marker::Str16 => {
                let n = self.reader.u16()? as usize;
                self.skip(n)
            }
            Marker::Bin32 | Marker::Str32 => {
                let n = self.reader.u32()? as usize;
                self.skip(n)
            }
            Marker::Ext8 => {
                let n = self.reader.u8()? as usize;
                self.skip(n + 1)
            }
            Marker::Ext16 => {
                let n = self.reader.u16()? as usize;
                self.skip(n + 1)
            }
            Marker::Ext32 => {
                let n = self.reader.u32()? as usize;
                self.skip(n.saturating_add(1))
            }
            Marker::Uint8 | Marker::Int8 => self.skip(1),
            Marker::Uint16 | Marker::Int16 => self.skip(2),
            Marker::Float32 | Marker::Uint32 | Marker::Int32 => self.skip(4),
            Marker::Float64 | Marker::Uint64 | Marker::Int64 => self.skip(8),
            Marker::FixExt1 => self.skip(2),
            Marker::FixExt2 => self.skip(3),
            Marker::FixExt4 => self.skip(5),
            Marker::FixExt8 => self.skip(9),
            Marker::FixExt16 => self.skip(17),
            Marker::Array16 => Ok(Some(self.reader.u16()? as usize)),
            Marker::Array32 => Ok(Some(self.reader.u32()? as usize)),
            Marker::Map16 => Ok(Some(self.reader.u16()? as usize * 2)),
            Marker::Map32 => Ok(Some((self.reader.u32()? as usize).saturating_mul(2))),
        }
    }

    pub fn read_map_hdr(&mut self) -> Result<usize> {
        match Marker::from_u8(self.reader.u8()?) {
            Marker::FixMap(n) => Ok(n as usize),
            Marker::Map16 => Ok(self.reader.u16()? as usize),
            Marker::Map32 => Ok(self.reader.u32()? as usize),
            _ => Err(MsgPackError::NotMap),
        }
    }

    pub fn read_arr_hdr(&mut self) -> Result<usize> {
        match Marker::from_u8(self.reader.u8()?) {
            Marker::FixArray(n) => Ok(n as usize),
            Marker::Array16 => Ok(self.reader.u16()? as usize),
            Marker::Array32 => Ok(self.reader.u32()? as usize),
            _ => Err(MsgPackError::NotArr),
        }
    }

    pub fn read_str_hdr(&mut self) -> Result<usize> {
        match Marker::from_u8(self.reader.u8()?) {
            Marker::FixStr(n) => Ok(n as usize),
            Marker::Str8 => Ok(self.reader.u8()? as usize),
            Marker::Str16 => Ok(self.reader.u16()? as usize),
            Marker::Str32 => Ok(self.reader.u32()? as usize),
            _ => Err(MsgPackError::NotStr),
        }
    }

    /// Reads a string without copying it.
    pub fn read_key(&mut self) -> Result<&'a str> {
        let size = self.read_str_hdr()?;
        let bytes = self.reader.buf(size)?;
        std::str::from_utf8(bytes).map_err(|_| MsgPackError::InvalidUtf8)
    }

    /// Positions the cursor on the value stored under string key `key`.
    ///
    /// Entries with non-string keys are skipped.
    pub fn find_key(&mut self, key: &str) -> Result<&mut Self> {
        let size = self.read_map_hdr()?;
        for _ in 0..size {
            let is_str = matches!(
                Marker::from_u8(self.reader.peek()?),
                Marker::FixStr(_) | Marker::Str8 | Marker::Str16 | Marker::Str32
            );
            if is_str {
                if self.read_key()? == key {
                    return Ok(self);
                }
            } else {
                self.skip_any()?;
            }
            self.skip_any()?;
        }
        Err(MsgPackError::KeyNotFound)
    }

    /// Positions the cursor on element `index` of an array.
    pub fn find_index(&mut self, index: usize) -> Result<&mut Self> {
        let size = self.read_arr_hdr()?;
        if index >= size {
            return Err(MsgPackError::IndexOutOfBounds);
        }
        for _ in 0..index {
            self.skip_any()?;
        }
        Ok(self)
    }

    pub fn find_path(&mut self, path: &[PathSegment<'_>]) -> Result<&mut Self> {
        for segment in path {
            match segment {
                PathSegment::Key(key) => {
                    self.find_key(key)?;
                }
                PathSegment::Index(index) => {
                    self.find_index(*index)?;
                }
            }
        }
        Ok(self)
    }

    /// Decodes the value at the cursor and moves past it.
    pub fn read_value(&mut self, decoder: &MsgPackDecoder) -> Result<Value> {
        let mut source = SliceSource::at(self.reader.uint8, self.reader.x);
        let value = decoder.decode_from(&mut source)?;
        self.reader.x = source.position();
        Ok(value)
    }
}

/// Builds a reusable lookup for a fixed path. The returned closure yields
/// the byte offset of the selected value.
pub fn gen_shallow_reader<'p>(
    path: &'p [PathSegment<'p>],
) -> impl Fn(&[u8]) -> Result<usize> + 'p {
    move |data: &[u8]| {
        let mut shallow = ShallowReader::new(data);
        shallow.find_path(path)?;
        Ok(shallow.position())
    }
}
