//! Consumer-side interpretation of raw sensor words.

use serde::{Deserialize, Serialize};

/// Sensirion conversion for the temperature word: 175 * raw / 65536 - 45 °C.
pub fn celsius(raw: u16) -> f32 {
    175.0 * raw as f32 / 65536.0 - 45.0
}

/// One interpreted reading, as emitted by the polling consumer.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Reading {
    /// Raw 16-bit sensor word
    pub raw: u16,
    /// Converted temperature (°C)
    pub celsius: f32,
    /// Sequence number for ordering
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
}

impl Reading {
    pub fn new(raw: u16, seq: u64) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let t_utc_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            raw,
            celsius: celsius(raw),
            seq,
            t_utc_ns,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
