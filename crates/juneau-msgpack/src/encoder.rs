//! Streams a [`Value`] tree to any `io::Write` sink.
//!
//! Every header is derived from the value tree before the body is written,
//! so nothing is buffered except the few bytes of a tag/length header. The
//! encoder keeps no state between calls; `encode` takes `&self`.

use std::io::Write;

use juneau_buffers::Writer;

use crate::constants::*;
use crate::error::{MsgPackError, Result};
use crate::options::MsgPackOptions;
use crate::value::{Extension, Integer, Value};

#[derive(Debug, Clone, Default)]
pub struct MsgPackEncoder {
    options: MsgPackOptions,
}

impl MsgPackEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an encoder after validating `options`.
    pub fn with_options(options: MsgPackOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &MsgPackOptions {
        &self.options
    }

    /// Writes `value` to `sink` and returns the number of bytes written.
    ///
    /// On error the sink may hold a partial encoding, which must be
    /// discarded.
    pub fn encode<W: Write + ?Sized>(&self, value: &Value, sink: &mut W) -> Result<usize> {
        let mut emitter = Emitter {
            sink,
            options: &self.options,
            written: 0,
        };
        emitter.write_any(value, self.options.initial_depth)?;
        Ok(emitter.written)
    }

    /// Encodes into a fresh byte vector.
    pub fn encode_to_vec(&self, value: &Value) -> Result<Vec<u8>> {
        let mut writer = Writer::new();
        self.encode(value, &mut writer)?;
        Ok(writer.flush())
    }
}

struct Emitter<'a, W: Write + ?Sized> {
    sink: &'a mut W,
    options: &'a MsgPackOptions,
    written: usize,
}

fn len32(length: usize) -> Result<u32> {
    u32::try_from(length).map_err(|_| MsgPackError::NumericOverflow {
        target: "32-bit length",
    })
}

impl<W: Write + ?Sized> Emitter<'_, W> {
    fn raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink
            .write_all(bytes)
            .map_err(MsgPackError::SinkWriteFailure)?;
        self.written += bytes.len();
        Ok(())
    }

    #[inline]
    fn u8(&mut self, byte: u8) -> Result<()> {
        self.raw(&[byte])
    }

    fn u8u8(&mut self, tag: u8, val: u8) -> Result<()> {
        self.raw(&[tag, val])
    }

    fn u8u16(&mut self, tag: u8, val: u16) -> Result<()> {
        let [b0, b1] = val.to_be_bytes();
        self.raw(&[tag, b0, b1])
    }

    fn u8u32(&mut self, tag: u8, val: u32) -> Result<()> {
        let mut header = [tag, 0, 0, 0, 0];
        header[1..].copy_from_slice(&val.to_be_bytes());
        self.raw(&header)
    }

    fn u8u64(&mut self, tag: u8, val: [u8; 8]) -> Result<()> {
        let mut header = [tag, 0, 0, 0, 0, 0, 0, 0, 0];
        header[1..].copy_from_slice(&val);
        self.raw(&header)
    }

    fn enter(&self, depth: usize) -> Result<usize> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(MsgPackError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(depth)
    }

    fn write_any(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(b) => self.write_boolean(*b),
            Value::Integer(i) => self.write_integer(*i),
            Value::Float(f) => self.write_float(*f),
            Value::Str(s) if self.options.trim_strings => self.write_str(s.trim()),
            Value::Str(s) => self.write_str(s),
            Value::Binary(b) => self.write_bin(b),
            Value::Array(items) => self.write_arr(items, depth),
            Value::Map(entries) => self.write_map(entries, depth),
            Value::Extension(ext) => self.encode_ext(ext),
        }
    }

    fn write_null(&mut self) -> Result<()> {
        self.u8(NIL)
    }

    fn write_boolean(&mut self, b: bool) -> Result<()> {
        self.u8(if b { TRUE } else { FALSE })
    }

    fn write_float(&mut self, float: f64) -> Result<()> {
        if self.options.compact_floats && !float.is_nan() && (float as f32) as f64 == float {
            let [b0, b1, b2, b3] = (float as f32).to_be_bytes();
            return self.raw(&[FLOAT32, b0, b1, b2, b3]);
        }
        self.u8u64(FLOAT64, float.to_be_bytes())
    }

    /// Picks the narrowest family that holds `int` losslessly.
    fn write_integer(&mut self, int: Integer) -> Result<()> {
        match int.as_u64() {
            Some(uint) => self.write_u_integer(uint),
            // Negative integers always fit in i64.
            None => match int.as_i64() {
                Some(neg) => self.write_n_integer(neg),
                None => Err(MsgPackError::NumericOverflow { target: "i64" }),
            },
        }
    }

    fn write_u_integer(&mut self, uint: u64) -> Result<()> {
        if uint <= POSITIVE_FIXINT_MAX as u64 {
            self.u8(uint as u8)
        } else if uint <= u8::MAX as u64 {
            self.u8u8(UINT8, uint as u8)
        } else if uint <= u16::MAX as u64 {
            self.u8u16(UINT16, uint as u16)
        } else if uint <= u32::MAX as u64 {
            self.u8u32(UINT32, uint as u32)
        } else {
            self.u8u64(UINT64, uint.to_be_bytes())
        }
    }

    fn write_n_integer(&mut self, int: i64) -> Result<()> {
        if int >= -32 {
            // negative fixint: 0xe0..0xff
            self.u8(int as i8 as u8)
        } else if int >= i8::MIN as i64 {
            self.u8u8(INT8, int as i8 as u8)
        } else if int >= i16::MIN as i64 {
            self.u8u16(INT16, int as i16 as u16)
        } else if int >= i32::MIN as i64 {
            self.u8u32(INT32, int as i32 as u32)
        } else {
            self.u8u64(INT64, int.to_be_bytes())
        }
    }

    fn write_str_hdr(&mut self, length: usize) -> Result<()> {
        if length <= FIXSTR_MAX_LEN {
            self.u8(FIXSTR | length as u8)
        } else if length <= u8::MAX as usize {
            self.u8u8(STR8, length as u8)
        } else if length <= u16::MAX as usize {
            self.u8u16(STR16, length as u16)
        } else {
            self.u8u32(STR32, len32(length)?)
        }
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_str_hdr(s.len())?;
        self.raw(s.as_bytes())
    }

    fn write_bin_hdr(&mut self, length: usize) -> Result<()> {
        if length <= u8::MAX as usize {
            self.u8u8(BIN8, length as u8)
        } else if length <= u16::MAX as usize {
            self.u8u16(BIN16, length as u16)
        } else {
            self.u8u32(BIN32, len32(length)?)
        }
    }

    fn write_bin(&mut self, buf: &[u8]) -> Result<()> {
        self.write_bin_hdr(buf.len())?;
        self.raw(buf)
    }

    fn write_arr_hdr(&mut self, length: usize) -> Result<()> {
        if length <= FIXARRAY_MAX_LEN {
            self.u8(FIXARRAY | length as u8)
        } else if length <= u16::MAX as usize {
            self.u8u16(ARRAY16, length as u16)
        } else {
            self.u8u32(ARRAY32, len32(length)?)
        }
    }

    fn write_arr(&mut self, items: &[Value], depth: usize) -> Result<()> {
        let depth = self.enter(depth)?;
        self.write_arr_hdr(items.len())?;
        for item in items {
            self.write_any(item, depth)?;
        }
        Ok(())
    }

    fn write_map_hdr(&mut self, length: usize) -> Result<()> {
        if length <= FIXMAP_MAX_LEN {
            self.u8(FIXMAP | length as u8)
        } else if length <= u16::MAX as usize {
            self.u8u16(MAP16, length as u16)
        } else {
            self.u8u32(MAP32, len32(length)?)
        }
    }

    /// Whether a map entry holding `value` survives trimming. A nested map
    /// counts as empty when none of its own entries survive, so trimming a
    /// decoded output again drops nothing more.
    fn keeps_entry(&self, value: &Value, depth: usize) -> bool {
        match value {
            Value::Null => !self.options.trim_null_entries,
            Value::Array(items) if items.is_empty() => !self.options.trim_empty_collections,
            Value::Map(entries) if self.options.trim_empty_maps => {
                // Past the limit the write fails anyway; stop looking.
                depth >= self.options.max_depth
                    || entries.iter().any(|(_, v)| self.keeps_entry(v, depth + 1))
            }
            _ => true,
        }
    }

    fn write_key(&mut self, key: &Value, depth: usize) -> Result<()> {
        match key {
            Value::Str(s) => self.write_str(s),
            other => self.write_any(other, depth),
        }
    }

    fn write_map(&mut self, entries: &[(Value, Value)], depth: usize) -> Result<()> {
        let depth = self.enter(depth)?;
        let kept: Vec<&(Value, Value)> = if self.options.trims_entries() {
            entries
                .iter()
                .filter(|(_, v)| self.keeps_entry(v, depth))
                .collect()
        } else {
            entries.iter().collect()
        };
        self.write_map_hdr(kept.len())?;

        if !self.options.sort_maps {
            for (key, value) in kept {
                self.write_key(key, depth)?;
                self.write_any(value, depth)?;
            }
            return Ok(());
        }

        let mut keyed = Vec::with_capacity(kept.len());
        let mut scratch = Writer::new();
        for (key, value) in kept {
            let mut key_emitter = Emitter {
                sink: &mut scratch,
                options: self.options,
                written: 0,
            };
            key_emitter.write_key(key, depth)?;
            keyed.push((scratch.flush(), value));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        for (key_bytes, value) in keyed {
            self.raw(&key_bytes)?;
            self.write_any(value, depth)?;
        }
        Ok(())
    }

    fn encode_ext_header(&mut self, type_code: i8, length: usize) -> Result<()> {
        let code = type_code as u8;
        match length {
            1 => self.u8u8(FIXEXT1, code),
            2 => self.u8u8(FIXEXT2, code),
            4 => self.u8u8(FIXEXT4, code),
            8 => self.u8u8(FIXEXT8, code),
            16 => self.u8u8(FIXEXT16, code),
            _ if length <= u8::MAX as usize => self.raw(&[EXT8, length as u8, code]),
            _ if length <= u16::MAX as usize => {
                let [b0, b1] = (length as u16).to_be_bytes();
                self.raw(&[EXT16, b0, b1, code])
            }
            _ => {
                let [b0, b1, b2, b3] = len32(length)?.to_be_bytes();
                self.raw(&[EXT32, b0, b1, b2, b3, code])
            }
        }
    }

    fn encode_ext(&mut self, ext: &Extension) -> Result<()> {
        self.encode_ext_header(ext.type_code, ext.data.len())?;
        self.raw(&ext.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: &Value) -> Vec<u8> {
        MsgPackEncoder::new().encode_to_vec(value).unwrap()
    }

    #[test]
    fn integer_family_boundaries() {
        assert_eq!(enc(&Value::from(0u8)), [0x00]);
        assert_eq!(enc(&Value::from(127u8)), [0x7f]);
        assert_eq!(enc(&Value::from(128u8)), [0xcc, 0x80]);
        assert_eq!(enc(&Value::from(255u8)), [0xcc, 0xff]);
        assert_eq!(enc(&Value::from(256u16)), [0xcd, 0x01, 0x00]);
        assert_eq!(enc(&Value::from(65_536u32)), [0xce, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(
            enc(&Value::from(u64::MAX)),
            [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(enc(&Value::from(-1i8)), [0xff]);
        assert_eq!(enc(&Value::from(-32i8)), [0xe0]);
        assert_eq!(enc(&Value::from(-33i8)), [0xd0, 0xdf]);
        assert_eq!(enc(&Value::from(-128i16)), [0xd0, 0x80]);
        assert_eq!(enc(&Value::from(-129i16)), [0xd1, 0xff, 0x7f]);
        assert_eq!(
            enc(&Value::from(-32_769i32)),
            [0xd2, 0xff, 0xff, 0x7f, 0xff]
        );
        assert_eq!(
            enc(&Value::from(i64::MIN)),
            [0xd3, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn integer_300_uses_uint16() {
        assert_eq!(enc(&Value::from(300u16)), [0xcd, 0x01, 0x2c]);
    }

    #[test]
    fn string_header_widths() {
        assert_eq!(enc(&Value::from("")), [0xa0]);
        assert_eq!(enc(&Value::from("a".repeat(31)))[0], 0xbf);
        assert_eq!(&enc(&Value::from("a".repeat(32)))[..2], &[0xd9, 32]);
        assert_eq!(&enc(&Value::from("a".repeat(256)))[..3], &[0xda, 0x01, 0x00]);
        // Lengths count bytes, not characters.
        assert_eq!(enc(&Value::from("é")), [0xa2, 0xc3, 0xa9]);
    }

    #[test]
    fn extension_headers() {
        let fix = Value::Extension(Extension::new(5, vec![0xaa; 4]));
        assert_eq!(&enc(&fix)[..2], &[0xd6, 0x05]);
        let ext8 = Value::Extension(Extension::new(-2, vec![0xaa; 3]));
        assert_eq!(&enc(&ext8)[..3], &[0xc7, 0x03, 0xfe]);
        let empty = Value::Extension(Extension::new(1, Vec::new()));
        assert_eq!(enc(&empty), [0xc7, 0x00, 0x01]);
    }

    #[test]
    fn compact_floats_only_when_exact() {
        let encoder = MsgPackEncoder::with_options(MsgPackOptions {
            compact_floats: true,
            ..MsgPackOptions::default()
        })
        .unwrap();
        assert_eq!(
            encoder.encode_to_vec(&Value::Float(1.5)).unwrap(),
            [0xca, 0x3f, 0xc0, 0x00, 0x00]
        );
        assert_eq!(encoder.encode_to_vec(&Value::Float(0.1)).unwrap()[0], 0xcb);
        assert_eq!(encoder.encode_to_vec(&Value::Float(f64::NAN)).unwrap()[0], 0xcb);
    }

    #[test]
    fn depth_limit_applies_to_containers() {
        let encoder = MsgPackEncoder::with_options(MsgPackOptions {
            max_depth: 2,
            ..MsgPackOptions::default()
        })
        .unwrap();
        let ok = Value::Array(vec![Value::Array(vec![Value::from(1u8)])]);
        assert!(encoder.encode_to_vec(&ok).is_ok());
        let too_deep = Value::Array(vec![ok]);
        assert!(matches!(
            encoder.encode_to_vec(&too_deep),
            Err(MsgPackError::DepthExceeded { limit: 2 })
        ));
    }

    #[test]
    fn sink_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let result = MsgPackEncoder::new().encode(&Value::Null, &mut Broken);
        assert!(matches!(result, Err(MsgPackError::SinkWriteFailure(_))));
    }

    #[test]
    fn byte_count_matches_sink() {
        let value = Value::map([("k", Value::from(vec![Value::Null; 3]))]);
        let mut sink = Vec::new();
        let n = MsgPackEncoder::new().encode(&value, &mut sink).unwrap();
        assert_eq!(n, sink.len());
    }
}
