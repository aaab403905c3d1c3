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
use crate::telemetry::TelemetryRecord;

/// A builder for creating a `TelemetryRecord`.
pub struct TelemetryRecordBuilder {
    device_id: Option<String>,
    profile_id: Option<String>,
    timestamp: Option<i64>,
    pressure_map: Option<Vec<Vec<u16>>>,
    movement_status: bool,
}

impl TelemetryRecordBuilder {
    /// Creates a new `TelemetryRecordBuilder`.
    pub fn new() -> Self {
        Self {
            device_id: None,
            profile_id: None,
            timestamp: None,
            pressure_map: None,
            movement_status: false,
        }
    }

    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// Sets the timestamp in milliseconds since the Unix epoch.
    pub fn timestamp_ms(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn pressure_map(mut self, pressure_map: Vec<Vec<u16>>) -> Self {
        self.pressure_map = Some(pressure_map);
        self
    }

    /// Defaults to `false` when not set.
    pub fn movement_status(mut self, moving: bool) -> Self {
        self.movement_status = moving;
        self
    }

    /// Builds the `TelemetryRecord`.
    ///
    /// # Errors
    ///
    /// `MissingField` naming the first required field that has not been set.
    pub fn build(self) -> Result<TelemetryRecord, MessageError> {
        Ok(TelemetryRecord {
            device_id: self.device_id.ok_or(MessageError::MissingField("device_id"))?,
            profile_id: self.profile_id.ok_or(MessageError::MissingField("profile_id"))?,
            timestamp: self.timestamp.ok_or(MessageError::MissingField("timestamp"))?,
            pressure_map: self.pressure_map.ok_or(MessageError::MissingField("pressure_map"))?,
            movement_status: self.movement_status,
        })
    }
}

impl Default for TelemetryRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_complete_record() {
        let record = TelemetryRecordBuilder::new()
            .device_id("mat_001")
            .profile_id("yoga_mat_v1")
            .timestamp_ms(42)
            .pressure_map(vec![vec![0; 2]; 2])
            .movement_status(true)
            .build()
            .unwrap();

        assert_eq!(record.device_id, "mat_001");
        assert_eq!(record.timestamp, 42);
        assert!(record.movement_status);
    }

    #[test]
    fn reports_missing_field() {
        let result = TelemetryRecordBuilder::new()
            .device_id("mat_001")
            .timestamp_ms(42)
            .pressure_map(Vec::new())
            .build();

        assert_eq!(result, Err(MessageError::MissingField("profile_id")));
    }
}
