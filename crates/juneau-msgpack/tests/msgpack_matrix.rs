use std::io::Cursor;

use juneau_msgpack::{
    decode, encode, Extension, MsgPackDecoder, MsgPackEncoder, MsgPackError, MsgPackOptions,
    ShallowReader, Value,
};

fn with(options: MsgPackOptions) -> (MsgPackEncoder, MsgPackDecoder) {
    (
        MsgPackEncoder::with_options(options.clone()).unwrap(),
        MsgPackDecoder::with_options(options).unwrap(),
    )
}

fn nested_arrays(depth: usize) -> Value {
    let mut value = Value::Array(Vec::new());
    for _ in 1..depth {
        value = Value::Array(vec![value]);
    }
    value
}

fn assert_wire(value: Value, expected: &[u8]) {
    let bytes = encode(&value).unwrap();
    assert_eq!(bytes, expected, "encoding of {value:?}");
    assert_eq!(decode(&bytes).unwrap(), value, "decoding of {expected:02x?}");
}

#[test]
fn scalar_wire_matrix() {
    assert_wire(Value::Null, &[0xc0]);
    assert_wire(Value::Bool(false), &[0xc2]);
    assert_wire(Value::Bool(true), &[0xc3]);
    assert_wire(Value::Float(1.5), &[0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]);
    assert_wire(Value::Str(String::new()), &[0xa0]);
    assert_wire(Value::from("foo"), &[0xa3, b'f', b'o', b'o']);
    assert_wire(Value::Binary(Vec::new()), &[0xc4, 0x00]);
    assert_wire(Value::Binary(vec![1, 2]), &[0xc4, 0x02, 1, 2]);
}

#[test]
fn integer_wire_matrix() {
    assert_wire(Value::from(0u8), &[0x00]);
    assert_wire(Value::from(127u8), &[0x7f]);
    assert_wire(Value::from(128u8), &[0xcc, 0x80]);
    assert_wire(Value::from(255u8), &[0xcc, 0xff]);
    assert_wire(Value::from(256u16), &[0xcd, 0x01, 0x00]);
    assert_wire(Value::from(300u16), &[0xcd, 0x01, 0x2c]);
    assert_wire(Value::from(65_536u32), &[0xce, 0x00, 0x01, 0x00, 0x00]);
    assert_wire(
        Value::from(1u64 << 32),
        &[0xcf, 0, 0, 0, 0x01, 0, 0, 0, 0],
    );
    assert_wire(Value::from(u64::MAX), &[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);

    assert_wire(Value::from(-1i8), &[0xff]);
    assert_wire(Value::from(-32i8), &[0xe0]);
    assert_wire(Value::from(-33i8), &[0xd0, 0xdf]);
    assert_wire(Value::from(-128i16), &[0xd0, 0x80]);
    assert_wire(Value::from(-129i16), &[0xd1, 0xff, 0x7f]);
    assert_wire(Value::from(-32_769i32), &[0xd2, 0xff, 0xff, 0x7f, 0xff]);
    assert_wire(
        Value::from(i64::MIN),
        &[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0],
    );
    assert_wire(
        Value::from(i64::MAX),
        &[0xcf, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
    );
}

#[test]
fn non_negative_signed_input_uses_unsigned_tags() {
    assert_eq!(encode(&Value::from(5i64)).unwrap(), [0x05]);
    assert_eq!(encode(&Value::from(200i32)).unwrap(), [0xcc, 0xc8]);
    // Decoding int8 holding a positive value still yields the same integer.
    assert_eq!(decode(&[0xd0, 0x05]).unwrap(), Value::from(5u8));
}

#[test]
fn string_and_container_boundaries() {
    let s31 = "x".repeat(31);
    let s32 = "x".repeat(32);
    let s256 = "x".repeat(256);
    assert_eq!(encode(&Value::from(s31.as_str())).unwrap()[0], 0xbf);
    assert_eq!(encode(&Value::from(s32.as_str())).unwrap()[..2], [0xd9, 0x20]);
    assert_eq!(encode(&Value::from(s256.as_str())).unwrap()[..3], [0xda, 0x01, 0x00]);

    let arr15 = Value::Array((1..=15u8).map(Value::from).collect());
    let bytes = encode(&arr15).unwrap();
    assert_eq!((bytes[0], bytes.len()), (0x9f, 16));
    let arr16 = Value::Array((1..=16u8).map(Value::from).collect());
    assert_eq!(encode(&arr16).unwrap()[..3], [0xdc, 0x00, 0x10]);

    let map16 = Value::map((0..16u8).map(|i| (Value::from(i), Value::Null)));
    let bytes = encode(&map16).unwrap();
    assert_eq!(bytes[..3], [0xde, 0x00, 0x10]);
    assert_eq!(decode(&bytes).unwrap(), map16);

    assert_wire(Value::Array(Vec::new()), &[0x90]);
    assert_wire(Value::Map(Vec::new()), &[0x80]);
}

#[test]
fn extension_wire_matrix() {
    assert_wire(Value::Extension(Extension::new(5, vec![0xaa])), &[0xd4, 0x05, 0xaa]);
    assert_wire(
        Value::Extension(Extension::new(-2, vec![1, 2, 3])),
        &[0xc7, 0x03, 0xfe, 1, 2, 3],
    );
    let bytes = encode(&Value::Extension(Extension::new(1, vec![0; 16]))).unwrap();
    assert_eq!((bytes[0], bytes[1], bytes.len()), (0xd8, 0x01, 18));
    let bytes = encode(&Value::Extension(Extension::new(1, Vec::new()))).unwrap();
    assert_eq!(bytes, [0xc7, 0x00, 0x01]);
}

#[test]
fn document_scenario() {
    let value = Value::map([
        ("a", Value::from(1u8)),
        ("b", Value::Array(vec![Value::from(2u8), Value::from(3u8)])),
    ]);
    let bytes = encode(&value).unwrap();
    assert_eq!(bytes, [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x92, 0x02, 0x03]);
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn non_string_keys_round_trip() {
    let value = Value::map([
        (Value::from(1u8), Value::from("one")),
        (Value::Null, Value::Bool(true)),
        (Value::Array(vec![Value::from(2u8)]), Value::Binary(vec![9])),
    ]);
    let bytes = encode(&value).unwrap();
    assert_eq!(bytes[..5], [0x83, 0x01, 0xa3, b'o', b'n']);
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn encoding_is_stable() {
    let value = Value::map([
        ("id", Value::from(42u8)),
        ("tags", Value::Array(vec!["a".into(), "b".into()])),
        ("score", Value::Float(-0.25)),
    ]);
    let first = encode(&value).unwrap();
    let again = encode(&decode(&first).unwrap()).unwrap();
    assert_eq!(first, again);
}

#[test]
fn depth_limit_on_both_sides() {
    let options = MsgPackOptions {
        max_depth: 3,
        ..MsgPackOptions::default()
    };
    let (encoder, decoder) = with(options);

    let at_limit = encoder.encode_to_vec(&nested_arrays(3)).unwrap();
    assert_eq!(at_limit, [0x91, 0x91, 0x90]);
    assert_eq!(decoder.decode(&at_limit).unwrap(), nested_arrays(3));

    assert!(matches!(
        encoder.encode_to_vec(&nested_arrays(4)),
        Err(MsgPackError::DepthExceeded { limit: 3 })
    ));
    assert!(matches!(
        decoder.decode(&[0x91, 0x91, 0x91, 0x90]),
        Err(MsgPackError::DepthExceeded { limit: 3 })
    ));
    // Scalars never count toward depth.
    assert!(encoder.encode_to_vec(&Value::from(1u8)).is_ok());
}

fn nested_bytes(open: &[u8], levels: usize, innermost: u8) -> Vec<u8> {
    let mut bytes = open.repeat(levels - 1);
    bytes.push(innermost);
    bytes
}

#[test]
fn default_depth_limit_on_regular_thread() {
    // 1024 nested arrays: `91 91 ... 90`
    let at_limit = nested_bytes(&[0x91], 1024, 0x90);
    let value = decode(&at_limit).unwrap();
    assert_eq!(encode(&value).unwrap(), at_limit);
    assert_eq!(ShallowReader::new(&at_limit).skip_any().unwrap(), at_limit.len());

    let beyond = nested_bytes(&[0x91], 1025, 0x90);
    assert!(matches!(
        decode(&beyond),
        Err(MsgPackError::DepthExceeded { limit: 1024 })
    ));
    assert!(matches!(
        ShallowReader::new(&beyond).skip_any(),
        Err(MsgPackError::DepthExceeded { limit: 1024 })
    ));

    // 1024 nested maps keyed by 0: `81 00 81 00 ... 80`
    let maps = nested_bytes(&[0x81, 0x00], 1024, 0x80);
    let value = decode(&maps).unwrap();
    assert_eq!(encode(&value).unwrap(), maps);
    let sorted = MsgPackEncoder::with_options(MsgPackOptions {
        sort_maps: true,
        ..MsgPackOptions::default()
    })
    .unwrap();
    assert_eq!(sorted.encode_to_vec(&value).unwrap(), maps);
    assert!(matches!(
        decode(&nested_bytes(&[0x81, 0x00], 1025, 0x80)),
        Err(MsgPackError::DepthExceeded { limit: 1024 })
    ));
}

#[test]
fn hostile_nesting_is_rejected_not_overflowed() {
    let bytes = vec![0x91; 200_000];
    assert!(matches!(
        decode(&bytes),
        Err(MsgPackError::DepthExceeded { limit: 1024 })
    ));
    let decoder = MsgPackDecoder::new();
    let mut stream = decoder.iter_stream(Cursor::new(bytes));
    assert!(matches!(
        stream.next(),
        Some(Err(MsgPackError::DepthExceeded { .. }))
    ));
}

#[test]
fn initial_depth_consumes_budget() {
    let (encoder, decoder) = with(MsgPackOptions {
        max_depth: 3,
        initial_depth: 2,
        ..MsgPackOptions::default()
    });
    assert!(encoder.encode_to_vec(&nested_arrays(1)).is_ok());
    assert!(matches!(
        encoder.encode_to_vec(&nested_arrays(2)),
        Err(MsgPackError::DepthExceeded { .. })
    ));
    assert!(matches!(
        decoder.decode(&[0x91, 0x90]),
        Err(MsgPackError::DepthExceeded { .. })
    ));
}

#[test]
fn invalid_options_are_rejected() {
    for options in [
        MsgPackOptions {
            max_depth: 0,
            ..MsgPackOptions::default()
        },
        MsgPackOptions {
            max_depth: 2,
            initial_depth: 3,
            ..MsgPackOptions::default()
        },
    ] {
        assert!(matches!(
            MsgPackEncoder::with_options(options.clone()),
            Err(MsgPackError::InvalidOptions(_))
        ));
        assert!(MsgPackDecoder::with_options(options).is_err());
    }
}

#[test]
fn truncated_and_malformed_input() {
    assert!(matches!(decode(&[]), Err(MsgPackError::TruncatedInput { .. })));
    assert!(matches!(
        decode(&[0xcd, 0x01]),
        Err(MsgPackError::TruncatedInput { .. })
    ));
    assert!(matches!(
        decode(&[0x92, 0x01]),
        Err(MsgPackError::TruncatedInput { .. })
    ));
    // str declaring 10 bytes with 5 present
    assert!(matches!(
        decode(&[0xaa, b'h', b'e', b'l', b'l', b'o']),
        Err(MsgPackError::TruncatedInput {
            needed: 10,
            available: 5
        })
    ));
    assert!(matches!(
        decode(&[0x91, 0xc1]),
        Err(MsgPackError::InvalidTag { tag: 0xc1, offset: 1 })
    ));
    assert!(matches!(
        decode(&[0xa2, 0xff, 0xfe]),
        Err(MsgPackError::InvalidUtf8)
    ));
}

#[test]
fn hostile_lengths_fail_before_allocating() {
    // array32 claiming u32::MAX elements with nothing behind it
    assert!(matches!(
        decode(&[0xdd, 0xff, 0xff, 0xff, 0xff]),
        Err(MsgPackError::TruncatedInput { .. })
    ));
    assert!(matches!(
        decode(&[0xdf, 0xff, 0xff, 0xff, 0xff, 0x01]),
        Err(MsgPackError::TruncatedInput { .. })
    ));
    assert!(matches!(
        decode(&[0xc6, 0xff, 0xff, 0xff, 0xff]),
        Err(MsgPackError::TruncatedInput { .. })
    ));
}

#[test]
fn trailing_bytes() {
    let decoder = MsgPackDecoder::new();
    assert_eq!(decoder.decode(&[0x01, 0x02]).unwrap(), Value::from(1u8));
    assert!(matches!(
        decoder.decode_exact(&[0x01, 0x02, 0x03]),
        Err(MsgPackError::TrailingBytes(2))
    ));
}

#[test]
fn concatenated_values_from_slice_and_stream() {
    let bytes = [0x01, 0xa1, b'x', 0x90, 0xc0];
    let expected = vec![
        Value::from(1u8),
        Value::from("x"),
        Value::Array(Vec::new()),
        Value::Null,
    ];
    let decoder = MsgPackDecoder::new();
    let from_slice: Vec<Value> = decoder.iter(&bytes).collect::<Result<_, _>>().unwrap();
    assert_eq!(from_slice, expected);
    let from_stream: Vec<Value> = decoder
        .iter_stream(Cursor::new(bytes))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(from_stream, expected);

    let mut broken = decoder.iter_stream(Cursor::new([0x01, 0x92, 0x01]));
    assert_eq!(broken.next().unwrap().unwrap(), Value::from(1u8));
    assert!(matches!(
        broken.next(),
        Some(Err(MsgPackError::TruncatedInput { .. }))
    ));
    assert!(broken.next().is_none());
}

#[test]
fn sort_maps_orders_by_encoded_key() {
    let (encoder, _) = with(MsgPackOptions {
        sort_maps: true,
        ..MsgPackOptions::default()
    });
    let value = Value::map([
        (Value::from("b"), Value::from(1u8)),
        (Value::from("a"), Value::from(2u8)),
        (Value::from(7u8), Value::from(3u8)),
    ]);
    assert_eq!(
        encoder.encode_to_vec(&value).unwrap(),
        [0x83, 0x07, 0x03, 0xa1, b'a', 0x02, 0xa1, b'b', 0x01]
    );
    let reordered = Value::map([
        (Value::from(7u8), Value::from(3u8)),
        (Value::from("b"), Value::from(1u8)),
        (Value::from("a"), Value::from(2u8)),
    ]);
    assert_eq!(
        encoder.encode_to_vec(&value).unwrap(),
        encoder.encode_to_vec(&reordered).unwrap()
    );
}

#[test]
fn trimming_options() {
    let (encoder, _) = with(MsgPackOptions {
        trim_null_entries: true,
        trim_empty_maps: true,
        trim_empty_collections: true,
        trim_strings: true,
        ..MsgPackOptions::default()
    });
    let value = Value::map([
        ("a", Value::Null),
        ("b", Value::Map(Vec::new())),
        ("c", Value::Array(Vec::new())),
        ("d", Value::from("  hi ")),
    ]);
    assert_eq!(
        encoder.encode_to_vec(&value).unwrap(),
        [0x81, 0xa1, b'd', 0xa2, b'h', b'i']
    );
    // A map whose entries are all trimmed counts as empty.
    let nested = Value::map([
        ("a", Value::map([("x", Value::Null)])),
        ("b", Value::from(1u8)),
    ]);
    let first = encoder.encode_to_vec(&nested).unwrap();
    assert_eq!(first, [0x81, 0xa1, b'b', 0x01]);
    let (_, decoder) = with(MsgPackOptions::default());
    assert_eq!(
        encoder.encode_to_vec(&decoder.decode(&first).unwrap()).unwrap(),
        first
    );
    // Top-level and array members are never dropped.
    assert_eq!(
        encoder.encode_to_vec(&Value::Array(vec![Value::Null])).unwrap(),
        [0x91, 0xc0]
    );
}

#[test]
fn empty_map_trimming_needs_its_own_flag() {
    let (encoder, _) = with(MsgPackOptions {
        trim_null_entries: true,
        ..MsgPackOptions::default()
    });
    let nested = Value::map([("a", Value::map([("x", Value::Null)]))]);
    let first = encoder.encode_to_vec(&nested).unwrap();
    assert_eq!(first, [0x81, 0xa1, b'a', 0x80]);
    assert_eq!(encoder.encode_to_vec(&decode(&first).unwrap()).unwrap(), first);
}

#[test]
fn compact_floats_narrow_only_when_exact() {
    let (encoder, decoder) = with(MsgPackOptions {
        compact_floats: true,
        ..MsgPackOptions::default()
    });
    let bytes = encoder.encode_to_vec(&Value::Float(1.5)).unwrap();
    assert_eq!(bytes, [0xca, 0x3f, 0xc0, 0x00, 0x00]);
    assert_eq!(decoder.decode(&bytes).unwrap(), Value::Float(1.5));
    assert_eq!(encoder.encode_to_vec(&Value::Float(0.1)).unwrap()[0], 0xcb);
}

#[test]
fn stream_encoding_reports_written_length() {
    let value = Value::Array(vec![Value::from("abc"); 3]);
    let mut sink = Vec::new();
    let written = MsgPackEncoder::new().encode(&value, &mut sink).unwrap();
    assert_eq!(written, sink.len());
    assert_eq!(written, 13);
}
