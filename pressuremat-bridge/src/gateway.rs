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
use chrono::{DateTime, Utc};
use pressuremat_host_core::serial::SerialLineSource;
use pressuremat_host_core::{LineOutcome, LineSource, MatFrameAssembler};
use pressuremat_messages::gateway::{DeviceReport, MatrixStreamFrame};
use pressuremat_messages::{MATRIX_STREAM_TOPIC, encode_json};
use serialport::{SerialPortInfo, SerialPortType};
use std::time::Duration;

pub const DEFAULT_GATEWAY_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_GATEWAY_DEVICE_ID: &str = "pressure_mat_32x32";
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const SERIAL_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayAction {
    None,
    FramePublished,
    ReportPublished { topic: String },
}

/// Turns serial lines into broker messages.
pub struct Gateway<S> {
    device_id: String,
    assembler: MatFrameAssembler,
    sink: S,
}

impl<S: TelemetrySink> Gateway<S> {
    pub fn new(device_id: &str, sink: S) -> Self {
        Self {
            device_id: device_id.to_string(),
            assembler: MatFrameAssembler::new(),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Drop any partly assembled frame, used after the port reconnects.
    pub fn reset(&mut self) {
        self.assembler = MatFrameAssembler::new();
    }

    pub fn handle_line(&mut self, line: &str, now: DateTime<Utc>) -> Result<GatewayAction> {
        match self.assembler.push_line(line) {
            LineOutcome::FrameComplete(grid) => {
                let frame = MatrixStreamFrame {
                    device_id: self.device_id.clone(),
                    data: grid.to_nested_vec(),
                    timestamp: now,
                };
                self.sink.publish(MATRIX_STREAM_TOPIC, encode_json(&frame)?)?;
                log::debug!("Published frame to {}", MATRIX_STREAM_TOPIC);
                Ok(GatewayAction::FramePublished)
            }
            LineOutcome::FrameStarted | LineOutcome::RowAccepted => Ok(GatewayAction::None),
            // A report line breaks into a frame, so it is still forwarded
            LineOutcome::Ignored | LineOutcome::FrameDiscarded(_) => self.forward_report(line, now),
        }
    }

    fn forward_report(&mut self, line: &str, now: DateTime<Utc>) -> Result<GatewayAction> {
        let report = match DeviceReport::parse(line) {
            Ok(report) => report,
            Err(e) => {
                log::debug!("Ignoring line ({}): {}", e, line);
                return Ok(GatewayAction::None);
            }
        };

        log::info!("Received report from {}", report.device_id);
        let topic = report.topic();
        let payload = encode_json(&report.to_payload(now))?;
        self.sink.publish(&topic, payload)?;
        log::info!("Published to [{}]", topic);
        Ok(GatewayAction::ReportPublished { topic })
    }
}

fn looks_like_device(port: &SerialPortInfo) -> bool {
    if let SerialPortType::UsbPort(usb) = &port.port_type {
        if usb
            .manufacturer
            .as_deref()
            .is_some_and(|manufacturer| manufacturer.contains("Arduino"))
        {
            return true;
        }
    }

    let name = port.port_name.as_str();
    if name.to_lowercase().contains("usb") || name.contains("ACM") {
        return true;
    }
    name.starts_with("COM") && name != "COM1" && name != "COM2"
}

/// Pick the first port that looks like a microcontroller board.
pub fn discover_port(ports: &[SerialPortInfo]) -> Option<&SerialPortInfo> {
    ports.iter().find(|port| looks_like_device(port))
}

fn open_source(port: Option<&str>, baud_rate: u32) -> Option<SerialLineSource> {
    let port_name = match port {
        Some(port_name) => port_name.to_string(),
        None => {
            log::info!("Scanning serial ports...");
            let ports = match serialport::available_ports() {
                Ok(ports) => ports,
                Err(e) => {
                    log::error!("Scanning error: {}", e);
                    return None;
                }
            };
            match discover_port(&ports) {
                Some(found) => {
                    log::info!("Found potential device: {}", found.port_name);
                    found.port_name.clone()
                }
                None => {
                    log::warn!("No suitable device found");
                    return None;
                }
            }
        }
    };

    match SerialLineSource::open(&port_name, baud_rate, SERIAL_TIMEOUT) {
        Ok(source) => {
            log::info!("Serial port opened: {} at {} baud", port_name, baud_rate);
            Some(source)
        }
        Err(e) => {
            log::error!("Failed to open {}: {}", port_name, e);
            None
        }
    }
}

/// Forward serial traffic forever, reconnecting whenever the port goes away.
/// Returns only when publishing fails.
pub fn run_serial<S: TelemetrySink>(gateway: &mut Gateway<S>, port: Option<&str>, baud_rate: u32) -> Result<()> {
    loop {
        let Some(mut source) = open_source(port, baud_rate) else {
            log::info!("Retrying in {}s", RECONNECT_DELAY.as_secs());
            std::thread::sleep(RECONNECT_DELAY);
            continue;
        };

        gateway.reset();
        loop {
            match source.next_line() {
                Ok(Some(line)) => {
                    gateway.handle_line(&line, Utc::now())?;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Serial port closed ({}), reconnecting", e);
                    break;
                }
            }
        }
        std::thread::sleep(RECONNECT_DELAY);
    }
}
