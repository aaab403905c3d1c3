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
use rumqttc::{Client, Event, MqttOptions, Outgoing, Packet, QoS};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const KEEP_ALIVE: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Somewhere to publish serialised telemetry.
pub trait TelemetrySink {
    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

/// Publishes at QoS 0 without retain. The network event loop runs on a
/// helper thread.
pub struct MqttSink {
    client: Client,
    shutting_down: Arc<AtomicBool>,
    event_loop: JoinHandle<()>,
}

impl MqttSink {
    pub fn connect(client_id: &str, host: &str, port: u16) -> Self {
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(KEEP_ALIVE);

        let (client, mut connection) = Client::new(options, REQUEST_CHANNEL_CAPACITY);
        let shutting_down = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&shutting_down);

        let event_loop = thread::spawn(move || {
            for notification in connection.iter() {
                match notification {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => log::info!("Connected to MQTT broker"),
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                    Ok(event) => log::trace!("MQTT event: {:?}", event),
                    Err(e) => {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }
                        log::warn!("MQTT connection error: {}", e);
                        thread::sleep(RECONNECT_DELAY);
                    }
                }
            }
            log::debug!("MQTT event loop finished");
        });

        Self {
            client,
            shutting_down,
            event_loop,
        }
    }

    /// Flush queued publishes and disconnect.
    pub fn shutdown(self) -> Result<()> {
        self.shutting_down.store(true, Ordering::Relaxed);
        self.client.disconnect()?;
        drop(self.client);
        self.event_loop
            .join()
            .map_err(|_| anyhow::anyhow!("MQTT event loop panicked"))
    }
}

impl TelemetrySink for MqttSink {
    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client.publish(topic, QoS::AtMostOnce, false, payload)?;
        log::trace!("Queued publish to {}", topic);
        Ok(())
    }
}
