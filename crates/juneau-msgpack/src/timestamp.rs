//! The predefined timestamp extension (type code -1).
//!
//! Three layouts exist, chosen by the encoder from the value:
//!
//! | payload | layout |
//! |---|---|
//! | 4 bytes | `u32` seconds, nanoseconds zero |
//! | 8 bytes | 30-bit nanoseconds, 34-bit seconds |
//! | 12 bytes | `u32` nanoseconds, `i64` seconds |

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::TIMESTAMP_EXT_TYPE;
use crate::error::{MsgPackError, Result};
use crate::value::{Extension, Value};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanoseconds: u32) -> Result<Self> {
        if nanoseconds >= NANOS_PER_SEC {
            return Err(MsgPackError::InvalidTimestamp);
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    pub fn to_extension(&self) -> Extension {
        let data = if self.seconds >> 34 == 0 {
            let packed = ((self.nanoseconds as u64) << 34) | self.seconds as u64;
            if packed >> 32 == 0 {
                (packed as u32).to_be_bytes().to_vec()
            } else {
                packed.to_be_bytes().to_vec()
            }
        } else {
            let mut data = Vec::with_capacity(12);
            data.extend_from_slice(&self.nanoseconds.to_be_bytes());
            data.extend_from_slice(&self.seconds.to_be_bytes());
            data
        };
        Extension::new(TIMESTAMP_EXT_TYPE, data)
    }

    pub fn from_extension(ext: &Extension) -> Result<Self> {
        if ext.type_code != TIMESTAMP_EXT_TYPE {
            return Err(MsgPackError::InvalidTimestamp);
        }
        match *ext.data.as_slice() {
            [a, b, c, d] => Timestamp::new(u32::from_be_bytes([a, b, c, d]) as i64, 0),
            [a, b, c, d, e, f, g, h] => {
                let packed = u64::from_be_bytes([a, b, c, d, e, f, g, h]);
                Timestamp::new(
                    (packed & 0x0000_0003_ffff_ffff) as i64,
                    (packed >> 34) as u32,
                )
            }
            [a, b, c, d, e, f, g, h, i, j, k, l] => Timestamp::new(
                i64::from_be_bytes([e, f, g, h, i, j, k, l]),
                u32::from_be_bytes([a, b, c, d]),
            ),
            _ => Err(MsgPackError::InvalidTimestamp),
        }
    }

    pub fn from_system_time(time: SystemTime) -> Result<Self> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => {
                let seconds = i64::try_from(after.as_secs())
                    .map_err(|_| MsgPackError::NumericOverflow { target: "i64" })?;
                Timestamp::new(seconds, after.subsec_nanos())
            }
            Err(e) => {
                // Before the epoch: floor the seconds, keep nanoseconds positive.
                let before = e.duration();
                let mut seconds = -i64::try_from(before.as_secs())
                    .map_err(|_| MsgPackError::NumericOverflow { target: "i64" })?;
                let mut nanoseconds = before.subsec_nanos();
                if nanoseconds > 0 {
                    seconds -= 1;
                    nanoseconds = NANOS_PER_SEC - nanoseconds;
                }
                Timestamp::new(seconds, nanoseconds)
            }
        }
    }

    pub fn to_system_time(&self) -> Option<SystemTime> {
        let nanos = Duration::from_nanos(self.nanoseconds as u64);
        if self.seconds >= 0 {
            UNIX_EPOCH
                .checked_add(Duration::from_secs(self.seconds as u64))?
                .checked_add(nanos)
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(self.seconds.unsigned_abs()))?
                .checked_add(nanos)
        }
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Extension(ts.to_extension())
    }
}

impl TryFrom<&Value> for Timestamp {
    type Error = MsgPackError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Extension(ext) => Timestamp::from_extension(ext),
            other => Err(MsgPackError::UnsupportedValueKind {
                expected: "timestamp extension",
                found: other.kind(),
            }),
        }
    }
}
