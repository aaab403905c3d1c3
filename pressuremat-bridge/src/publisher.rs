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

use crate::mqtt::TelemetrySink;
use anyhow::Result;
use pressuremat_messages::telemetry::builder::TelemetryRecordBuilder;
use pressuremat_messages::telemetry::{PRESSURE_MAP_SIZE, TelemetryRecord};
use pressuremat_messages::{encode_json, telemetry_topic};
use rand::Rng;
use std::time::Duration;

pub const DEFAULT_DEVICE_ID: &str = "mat_001";
pub const DEFAULT_PROFILE_ID: &str = "yoga_mat_v1";
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_SYNTHETIC_READING: u16 = 100;

/// Publishes random pressure maps for a single fake device.
pub struct MockPublisher<R> {
    rng: R,
    device_id: String,
    profile_id: String,
    topic: String,
}

impl<R: Rng> MockPublisher<R> {
    pub fn new(rng: R, device_id: &str, profile_id: &str) -> Self {
        Self {
            rng,
            device_id: device_id.to_string(),
            profile_id: profile_id.to_string(),
            topic: telemetry_topic(device_id),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn next_record(&mut self, timestamp_ms: i64) -> Result<TelemetryRecord> {
        let pressure_map = (0..PRESSURE_MAP_SIZE)
            .map(|_| {
                (0..PRESSURE_MAP_SIZE)
                    .map(|_| self.rng.gen_range(0..=MAX_SYNTHETIC_READING))
                    .collect()
            })
            .collect();

        let record = TelemetryRecordBuilder::new()
            .device_id(self.device_id.as_str())
            .profile_id(self.profile_id.as_str())
            .timestamp_ms(timestamp_ms)
            .pressure_map(pressure_map)
            .movement_status(self.rng.gen_bool(0.5))
            .build()?;
        Ok(record)
    }

    /// Build and publish one record, no retry.
    pub fn publish_next<S: TelemetrySink>(&mut self, sink: &mut S, timestamp_ms: i64) -> Result<TelemetryRecord> {
        let record = self.next_record(timestamp_ms)?;
        sink.publish(&self.topic, encode_json(&record)?)?;
        log::info!(
            "Sent record for {} at {} (movement: {})",
            record.device_id,
            record.timestamp,
            record.movement_status
        );
        log::debug!("Record: {:?}", record);
        Ok(record)
    }

    /// Publish every `interval`, forever or until `count` records are sent.
    pub fn run<S: TelemetrySink>(&mut self, sink: &mut S, interval: Duration, count: Option<u64>) -> Result<()> {
        let mut sent = 0u64;
        while count.is_none_or(|count| sent < count) {
            if sent > 0 {
                std::thread::sleep(interval);
            }
            self.publish_next(sink, chrono::Utc::now().timestamp_millis())?;
            sent += 1;
        }
        Ok(())
    }
}
