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

use anyhow::Result;
use pressuremat_bridge::publisher::{
    DEFAULT_DEVICE_ID, DEFAULT_PROFILE_ID, DEFAULT_PUBLISH_INTERVAL, MockPublisher,
};
use pressuremat_bridge::util::{self, BrokerArgs};
use pressuremat_bridge::MqttSink;
use std::time::Duration;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    util::init_logging(&args);

    let broker = BrokerArgs::from_args(&args)?;
    let device_id = util::option_value(&args, "--device-id").unwrap_or(DEFAULT_DEVICE_ID);
    let profile_id = util::option_value(&args, "--profile-id").unwrap_or(DEFAULT_PROFILE_ID);
    let interval_ms = util::parse_option(&args, "--interval-ms", DEFAULT_PUBLISH_INTERVAL.as_millis() as u64)?;
    let interval = Duration::from_millis(interval_ms);
    let count = match util::option_value(&args, "--count") {
        Some(_) => Some(util::parse_option::<u64>(&args, "--count", 0)?),
        None => None,
    };

    log::info!("Connecting to mqtt://{}:{}", broker.host, broker.port);
    let mut sink = MqttSink::connect(&format!("mock-{}", device_id), &broker.host, broker.port);

    let mut publisher = MockPublisher::new(rand::thread_rng(), device_id, profile_id);
    log::info!(
        "Publishing to {} every {} ms",
        publisher.topic(),
        interval.as_millis()
    );
    publisher.run(&mut sink, interval, count)?;

    sink.shutdown()
}
