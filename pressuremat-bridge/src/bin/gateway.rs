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
use pressuremat_bridge::gateway::{self, DEFAULT_GATEWAY_BAUD_RATE, DEFAULT_GATEWAY_DEVICE_ID, Gateway};
use pressuremat_bridge::util::{self, BrokerArgs};
use pressuremat_bridge::MqttSink;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    util::init_logging(&args);

    let broker = BrokerArgs::from_args(&args)?;
    let port = util::option_value(&args, "--port");
    let baud_rate = util::parse_option(&args, "--baud", DEFAULT_GATEWAY_BAUD_RATE)?;
    let device_id = util::option_value(&args, "--device-id").unwrap_or(DEFAULT_GATEWAY_DEVICE_ID);

    log::info!("Connecting to mqtt://{}:{}", broker.host, broker.port);
    let sink = MqttSink::connect(&format!("gateway-{}", device_id), &broker.host, broker.port);

    let mut gateway = Gateway::new(device_id, sink);
    gateway::run_serial(&mut gateway, port, baud_rate)?;

    gateway.into_sink().shutdown()
}
