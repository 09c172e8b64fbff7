//! Core logic behind the `msgpack-pack` and `msgpack-unpack` binaries.
//!
//! - `msgpack-pack`: JSON on stdin, MessagePack on stdout
//! - `msgpack-unpack`: MessagePack on stdin, JSON on stdout

use std::io;
use std::path::Path;

use juneau_msgpack::{MsgPackDecoder, MsgPackEncoder, MsgPackError, MsgPackOptions, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Codec(#[from] MsgPackError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Loads codec options from a TOML file. Missing keys keep their defaults.
pub fn load_options(path: &Path) -> Result<MsgPackOptions, CliError> {
    let text = std::fs::read_to_string(path)?;
    let options: MsgPackOptions = toml::from_str(&text)?;
    options.validate()?;
    Ok(options)
}

/// Encode a JSON document to MessagePack bytes.
pub fn pack(json: &str, options: &MsgPackOptions) -> Result<Vec<u8>, CliError> {
    let doc: serde_json::Value = serde_json::from_str(json)?;
    let encoder = MsgPackEncoder::with_options(options.clone())?;
    Ok(encoder.encode_to_vec(&Value::from(doc))?)
}

/// How `unpack` renders its output.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnpackFormat {
    /// Single-line JSON instead of pretty-printed.
    pub compact: bool,
    /// Decode every concatenated value and print them as one JSON array.
    pub all: bool,
}

/// Decode MessagePack bytes to a JSON string.
pub fn unpack(
    bytes: &[u8],
    options: &MsgPackOptions,
    format: UnpackFormat,
) -> Result<String, CliError> {
    let decoder = MsgPackDecoder::with_options(options.clone())?;
    let doc = if format.all {
        let values = decoder
            .iter(bytes)
            .map(|value| -> Result<serde_json::Value, CliError> {
                Ok(serde_json::Value::try_from(value?)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        serde_json::Value::Array(values)
    } else {
        serde_json::Value::try_from(decoder.decode_exact(bytes)?)?
    };
    let text = if format.compact {
        serde_json::to_string(&doc)?
    } else {
        serde_json::to_string_pretty(&doc)?
    };
    Ok(text)
}
