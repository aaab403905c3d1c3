// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use core::fmt;
use serde::{Deserialize, Serialize};

pub mod gateway;
pub mod telemetry;

/// Topic that carries complete frames forwarded from the serial link.
pub const MATRIX_STREAM_TOPIC: &str = "iot/matrix/stream";

/// Per-device telemetry topic, `iot/<device_id>/telemetry`.
pub fn telemetry_topic(device_id: &str) -> String {
    format!("iot/{}/telemetry", device_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// A builder was finished without a required field, value is the field name
    MissingField(&'static str),
    /// The line does not have the `DEVICE_ID|PROFILE_ID|JSON` shape
    NotADeviceReport,
    /// The JSON part of a report is malformed or not an object
    InvalidJson,
    EncodingError,
    DecodingError,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::MissingField(field) => write!(f, "missing field: {}", field),
            MessageError::NotADeviceReport => write!(f, "not a device report line"),
            MessageError::InvalidJson => write!(f, "invalid JSON object"),
            MessageError::EncodingError => write!(f, "JSON encoding failed"),
            MessageError::DecodingError => write!(f, "JSON decoding failed"),
        }
    }
}

impl std::error::Error for MessageError {}

/// Serialise a message to the JSON bytes published on the broker.
///
/// # Errors
///
/// - `EncodingError`: if the message could not be represented as JSON
pub fn encode_json<M>(msg: &M) -> Result<Vec<u8>, MessageError>
where
    M: Serialize,
{
    serde_json::to_vec(msg).map_err(|_| MessageError::EncodingError)
}

pub fn decode_json<'b, M>(buffer: &'b [u8]) -> Result<M, MessageError>
where
    M: Deserialize<'b>,
{
    serde_json::from_slice(buffer).map_err(|_| MessageError::DecodingError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_topic_embeds_device_id() {
        assert_eq!(telemetry_topic("mat_001"), "iot/mat_001/telemetry");
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_json::<telemetry::TelemetryRecord>(b"{not json");
        assert_eq!(result, Err(MessageError::DecodingError));
    }
}
