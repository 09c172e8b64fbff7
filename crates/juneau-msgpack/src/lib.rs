//! MessagePack codec over a closed [`Value`] tree.
//!
//! - [`MsgPackEncoder`] streams a value to any `io::Write` sink, choosing the
//!   narrowest tag for every integer, string, binary and container.
//! - [`MsgPackDecoder`] reads one value at a time from a [`Source`], checking
//!   declared lengths against the remaining input before reading.
//! - [`ShallowReader`] navigates encoded bytes without decoding them.
//! - [`ToValue`] / [`FromValue`] map application types to and from values.
//!
//! ```
//! use juneau_msgpack::{decode, encode, Value};
//!
//! let value = Value::map([
//!     ("a", Value::from(1u8)),
//!     ("b", Value::Array(vec![2u8.into(), 3u8.into()])),
//! ]);
//! let bytes = encode(&value).unwrap();
//! assert_eq!(bytes, [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x92, 0x02, 0x03]);
//! assert_eq!(decode(&bytes).unwrap(), value);
//! ```

pub mod adapter;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod json;
pub mod options;
pub mod shallow_read;
pub mod source;
pub mod timestamp;
pub mod util;
pub mod value;

pub use adapter::{from_slice, to_vec, FromValue, ToValue};
pub use constants::Marker;
pub use decoder::{MsgPackDecoder, SliceValues, StreamValues};
pub use encoder::MsgPackEncoder;
pub use error::{MsgPackError, Result};
pub use options::MsgPackOptions;
pub use shallow_read::{gen_shallow_reader, PathSegment, ShallowReader};
pub use source::{IoSource, SliceSource, Source};
pub use timestamp::Timestamp;
pub use util::{decode, encode};
pub use value::{Extension, Integer, Value};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn codec_types_are_thread_safe() {
        assert_send_sync::<MsgPackEncoder>();
        assert_send_sync::<MsgPackDecoder>();
        assert_send_sync::<Value>();
    }

    #[test]
    fn concurrent_calls_share_one_encoder() {
        let encoder = MsgPackEncoder::new();
        let decoder = MsgPackDecoder::new();
        std::thread::scope(|scope| {
            for i in 0..4u32 {
                let (encoder, decoder) = (&encoder, &decoder);
                scope.spawn(move || {
                    let value = Value::from(vec![Value::from(i); 100]);
                    let bytes = encoder.encode_to_vec(&value).unwrap();
                    assert_eq!(decoder.decode(&bytes).unwrap(), value);
                });
            }
        });
    }
}
