//! Encoder and decoder settings.

use serde::Deserialize;

use crate::constants::DEFAULT_MAX_DEPTH;
use crate::error::{MsgPackError, Result};

/// Codec settings. Construct with struct-update syntax over
/// [`MsgPackOptions::default`] and hand to
/// [`MsgPackEncoder::with_options`](crate::MsgPackEncoder::with_options) or
/// [`MsgPackDecoder::with_options`](crate::MsgPackDecoder::with_options),
/// which validate once.
///
/// The decoder only reads `max_depth` and `initial_depth`; the remaining
/// fields shape what the encoder writes.
///
/// ```
/// use juneau_msgpack::{MsgPackEncoder, MsgPackOptions};
///
/// let encoder = MsgPackEncoder::with_options(MsgPackOptions {
///     sort_maps: true,
///     ..MsgPackOptions::default()
/// })
/// .unwrap();
/// assert!(encoder.options().sort_maps);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MsgPackOptions {
    /// Deepest container nesting allowed. `[]` has depth 1.
    pub max_depth: usize,
    /// Depth the top-level value starts at.
    pub initial_depth: usize,
    /// Write map entries ordered by their encoded key bytes.
    pub sort_maps: bool,
    /// Write floats as float32 when that is exact.
    pub compact_floats: bool,
    /// Omit map entries whose value is null.
    pub trim_null_entries: bool,
    /// Omit map entries whose value is a map left empty by trimming.
    pub trim_empty_maps: bool,
    /// Omit map entries whose value is an empty array.
    pub trim_empty_collections: bool,
    /// Trim surrounding whitespace from string values. Keys are untouched.
    pub trim_strings: bool,
}

impl Default for MsgPackOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            initial_depth: 0,
            sort_maps: false,
            compact_floats: false,
            trim_null_entries: false,
            trim_empty_maps: false,
            trim_empty_collections: false,
            trim_strings: false,
        }
    }
}

impl MsgPackOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(MsgPackError::InvalidOptions("max_depth must be positive"));
        }
        if self.initial_depth > self.max_depth {
            return Err(MsgPackError::InvalidOptions(
                "initial_depth must not exceed max_depth",
            ));
        }
        Ok(())
    }

    /// True when any option filters map entries.
    pub(crate) fn trims_entries(&self) -> bool {
        self.trim_null_entries || self.trim_empty_maps || self.trim_empty_collections
    }
}
