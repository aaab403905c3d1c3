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

use crate::MessageError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

const FIELD_SEPARATOR: char = '|';

/// A `DEVICE_ID|PROFILE_ID|JSON_OBJECT` line sent by a device over serial.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub device_id: String,
    pub profile_id: String,
    pub metrics: Map<String, Value>,
}

impl DeviceReport {
    /// Parse a report line. Only the first two separators split fields, the
    /// JSON part may contain `|` itself.
    ///
    /// # Errors
    ///
    /// - `NotADeviceReport`: fewer than three fields
    /// - `InvalidJson`: the third field is not a JSON object
    pub fn parse(line: &str) -> Result<Self, MessageError> {
        let mut fields = line.splitn(3, FIELD_SEPARATOR);
        let (Some(device_id), Some(profile_id), Some(raw_json)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(MessageError::NotADeviceReport);
        };

        match serde_json::from_str::<Value>(raw_json) {
            Ok(Value::Object(metrics)) => Ok(Self {
                device_id: device_id.to_string(),
                profile_id: profile_id.to_string(),
                metrics,
            }),
            _ => Err(MessageError::InvalidJson),
        }
    }

    pub fn topic(&self) -> String {
        crate::telemetry_topic(&self.device_id)
    }

    /// The published payload: identifiers and timestamp, then the metrics.
    /// A metric with the same name as an identifier replaces it.
    pub fn to_payload(&self, timestamp: DateTime<Utc>) -> Value {
        let mut payload = Map::new();
        payload.insert("device_id".into(), Value::String(self.device_id.clone()));
        payload.insert("profile_id".into(), Value::String(self.profile_id.clone()));
        payload.insert(
            "timestamp".into(),
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        payload.extend(self.metrics.clone());
        Value::Object(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_report_with_pipe_in_json() {
        let report = DeviceReport::parse(r#"mat_001|yoga_mat_v1|{"note":"a|b","weight":12}"#).unwrap();

        assert_eq!(report.device_id, "mat_001");
        assert_eq!(report.profile_id, "yoga_mat_v1");
        assert_eq!(report.metrics["note"], "a|b");
        assert_eq!(report.metrics["weight"], 12);
        assert_eq!(report.topic(), "iot/mat_001/telemetry");
    }

    #[test]
    fn rejects_short_lines() {
        assert_eq!(DeviceReport::parse("mat_001|yoga"), Err(MessageError::NotADeviceReport));
        assert_eq!(DeviceReport::parse("0 0 0 0"), Err(MessageError::NotADeviceReport));
    }

    #[test]
    fn rejects_non_object_json() {
        assert_eq!(DeviceReport::parse("mat_001|yoga|[1,2]"), Err(MessageError::InvalidJson));
        assert_eq!(DeviceReport::parse("mat_001|yoga|{broken"), Err(MessageError::InvalidJson));
    }

    #[test]
    fn payload_flattens_metrics() {
        let report = DeviceReport::parse(r#"mat_001|yoga_mat_v1|{"movement_status":true}"#).unwrap();
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let payload = report.to_payload(timestamp);
        assert_eq!(payload["device_id"], "mat_001");
        assert_eq!(payload["profile_id"], "yoga_mat_v1");
        assert_eq!(payload["timestamp"], "2025-03-01T12:00:00.000Z");
        assert_eq!(payload["movement_status"], true);
    }
}
