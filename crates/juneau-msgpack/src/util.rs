//! Convenience MessagePack helpers using default options.

use crate::error::Result;
use crate::value::Value;
use crate::{MsgPackDecoder, MsgPackEncoder};

/// Encode `value` into a new byte vector.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    MsgPackEncoder::new().encode_to_vec(value)
}

/// Decode the first value in `blob`; trailing bytes are ignored.
pub fn decode(blob: &[u8]) -> Result<Value> {
    MsgPackDecoder::new().decode(blob)
}
