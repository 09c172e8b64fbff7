//! MessagePack tag table.
//!
//! Single-byte markers and the inline ranges of the fix families. Values
//! follow the MessagePack format as published.

pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;
pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xa0;
pub const NEGATIVE_FIXINT_MIN: u8 = 0xe0;

pub const FIXMAP_MAX_LEN: usize = 0x0f;
pub const FIXARRAY_MAX_LEN: usize = 0x0f;
pub const FIXSTR_MAX_LEN: usize = 0x1f;

pub const NIL: u8 = 0xc0;
/// Never used by the format; decoding it is an error.
pub const RESERVED: u8 = 0xc1;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;

pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;

pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;

pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;

pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;

pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;

pub const FIXEXT1: u8 = 0xd4;
pub const FIXEXT2: u8 = 0xd5;
pub const FIXEXT4: u8 = 0xd6;
pub const FIXEXT8: u8 = 0xd7;
pub const FIXEXT16: u8 = 0xd8;

pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;

pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;

pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;

/// Extension type code reserved for timestamps.
pub const TIMESTAMP_EXT_TYPE: i8 = -1;

/// Default nesting limit for encoding and decoding.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// One-byte families as classified by the leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    PositiveFixint(u8),
    NegativeFixint(i8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Nil,
    Reserved,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    Float32,
    Float64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
}

impl Marker {
    /// Classifies a tag byte. Every byte maps to exactly one family.
    pub fn from_u8(byte: u8) -> Marker {
        match byte {
            0x00..=POSITIVE_FIXINT_MAX => Marker::PositiveFixint(byte),
            0x80..=0x8f => Marker::FixMap(byte & 0x0f),
            0x90..=0x9f => Marker::FixArray(byte & 0x0f),
            0xa0..=0xbf => Marker::FixStr(byte & 0x1f),
            NIL => Marker::Nil,
            RESERVED => Marker::Reserved,
            FALSE => Marker::False,
            TRUE => Marker::True,
            BIN8 => Marker::Bin8,
            BIN16 => Marker::Bin16,
            BIN32 => Marker::Bin32,
            EXT8 => Marker::Ext8,
            EXT16 => Marker::Ext16,
            EXT32 => Marker::Ext32,
            FLOAT32 => Marker::Float32,
            FLOAT64 => Marker::Float64,
            UINT8 => Marker::Uint8,
            UINT16 => Marker::Uint16,
            UINT32 => Marker::Uint32,
            UINT64 => Marker::Uint64,
            INT8 => Marker::Int8,
            INT16 => Marker::Int16,
            INT32 => Marker::Int32,
            INT64 => Marker::Int64,
            FIXEXT1 => Marker::FixExt1,
            FIXEXT2 => Marker::FixExt2,
            FIXEXT4 => Marker::FixExt4,
            FIXEXT8 => Marker::FixExt8,
            FIXEXT16 => Marker::FixExt16,
            STR8 => Marker::Str8,
            STR16 => Marker::Str16,
            STR32 => Marker::Str32,
            ARRAY16 => Marker::Array16,
            ARRAY32 => Marker::Array32,
            MAP16 => Marker::Map16,
            MAP32 => Marker::Map32,
            NEGATIVE_FIXINT_MIN..=0xff => Marker::NegativeFixint(byte as i8),
        }
    }
}
