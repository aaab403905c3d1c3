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

use crate::line_buffer::{LineBuffer, LineSource};
use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult};
use std::time::Duration;

const SERIAL_RX_BUFFER_SIZE: usize = 4096;
const READ_CHUNK_SIZE: usize = 512;

/// Reads lines from a serial port. `next_line` blocks up to the port timeout.
pub struct SerialLineSource {
    serial: Box<dyn serialport::SerialPort>,
    rx_buffer: LineBuffer<SERIAL_RX_BUFFER_SIZE>,
}

impl SerialLineSource {
    pub fn new(serial: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            serial,
            rx_buffer: LineBuffer::new(),
        }
    }

    pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> serialport::Result<Self> {
        let serial = serialport::new(port_name, baud_rate).timeout(timeout).open()?;
        Ok(Self::new(serial))
    }

    pub fn port_name(&self) -> Option<String> {
        self.serial.name()
    }

    /// Read whatever the port has into the rx buffer, returns the byte count.
    fn fill(&mut self) -> IoResult<usize> {
        if self.rx_buffer.free_space() == 0 {
            log::warn!("Discarding {} bytes without a line ending", self.rx_buffer.len());
            self.rx_buffer.clear();
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let wanted = READ_CHUNK_SIZE.min(self.rx_buffer.free_space());
        let received = match self.serial.read(&mut chunk[..wanted]) {
            Ok(received) => received,
            Err(e) if e.kind() == ErrorKind::TimedOut => 0,
            Err(e) => return Err(e),
        };

        log::trace!("Read {} bytes from serial", received);
        self.rx_buffer
            .extend(&chunk[..received])
            .map_err(|_| IoError::new(ErrorKind::InvalidData, "Serial rx buffer overflow"))?;
        Ok(received)
    }
}

impl LineSource for SerialLineSource {
    type Error = IoError;

    fn has_pending(&mut self) -> IoResult<bool> {
        if self.rx_buffer.has_complete_line() {
            return Ok(true);
        }
        Ok(self.serial.bytes_to_read()? > 0)
    }

    fn next_line(&mut self) -> IoResult<Option<String>> {
        loop {
            if let Some(line) = self.rx_buffer.pop_line() {
                return Ok(Some(line));
            }
            if self.fill()? == 0 {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
    use std::collections::VecDeque;
    use std::io::Write;

    /// Hands out queued reads, then times out like an idle port.
    struct ScriptedPort {
        reads: VecDeque<IoResult<Vec<u8>>>,
    }

    impl ScriptedPort {
        fn boxed(reads: Vec<IoResult<Vec<u8>>>) -> Box<dyn SerialPort> {
            Box::new(Self { reads: reads.into() })
        }
    }

    impl Read for ScriptedPort {
        fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
            match self.reads.pop_front() {
                Some(Ok(mut bytes)) => {
                    let count = bytes.len().min(buf.len());
                    buf[..count].copy_from_slice(&bytes[..count]);
                    if count < bytes.len() {
                        self.reads.push_front(Ok(bytes.split_off(count)));
                    }
                    Ok(count)
                }
                Some(Err(e)) => Err(e),
                None => Err(IoError::new(ErrorKind::TimedOut, "Operation timed out")),
            }
        }
    }

    impl Write for ScriptedPort {
        fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> IoResult<()> {
            Ok(())
        }
    }

    impl SerialPort for ScriptedPort {
        fn name(&self) -> Option<String> {
            Some("scripted".into())
        }
        fn baud_rate(&self) -> serialport::Result<u32> {
            Ok(460_800)
        }
        fn data_bits(&self) -> serialport::Result<DataBits> {
            Ok(DataBits::Eight)
        }
        fn flow_control(&self) -> serialport::Result<FlowControl> {
            Ok(FlowControl::None)
        }
        fn parity(&self) -> serialport::Result<Parity> {
            Ok(Parity::None)
        }
        fn stop_bits(&self) -> serialport::Result<StopBits> {
            Ok(StopBits::One)
        }
        fn timeout(&self) -> Duration {
            Duration::ZERO
        }
        fn set_baud_rate(&mut self, _: u32) -> serialport::Result<()> {
            Ok(())
        }
        fn set_data_bits(&mut self, _: DataBits) -> serialport::Result<()> {
            Ok(())
        }
        fn set_flow_control(&mut self, _: FlowControl) -> serialport::Result<()> {
            Ok(())
        }
        fn set_parity(&mut self, _: Parity) -> serialport::Result<()> {
            Ok(())
        }
        fn set_stop_bits(&mut self, _: StopBits) -> serialport::Result<()> {
            Ok(())
        }
        fn set_timeout(&mut self, _: Duration) -> serialport::Result<()> {
            Ok(())
        }
        fn write_request_to_send(&mut self, _: bool) -> serialport::Result<()> {
            Ok(())
        }
        fn write_data_terminal_ready(&mut self, _: bool) -> serialport::Result<()> {
            Ok(())
        }
        fn read_clear_to_send(&mut self) -> serialport::Result<bool> {
            Ok(true)
        }
        fn read_data_set_ready(&mut self) -> serialport::Result<bool> {
            Ok(true)
        }
        fn read_ring_indicator(&mut self) -> serialport::Result<bool> {
            Ok(false)
        }
        fn read_carrier_detect(&mut self) -> serialport::Result<bool> {
            Ok(false)
        }
        fn bytes_to_read(&self) -> serialport::Result<u32> {
            let queued: usize = self
                .reads
                .iter()
                .map(|read| read.as_ref().map_or(0, Vec::len))
                .sum();
            Ok(queued as u32)
        }
        fn bytes_to_write(&self) -> serialport::Result<u32> {
            Ok(0)
        }
        fn clear(&self, _: ClearBuffer) -> serialport::Result<()> {
            Ok(())
        }
        fn try_clone(&self) -> serialport::Result<Box<dyn SerialPort>> {
            Err(serialport::Error::new(serialport::ErrorKind::Unknown, "not clonable"))
        }
        fn set_break(&self) -> serialport::Result<()> {
            Ok(())
        }
        fn clear_break(&self) -> serialport::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn idle_port_gives_no_line() {
        let mut source = SerialLineSource::new(ScriptedPort::boxed(vec![]));

        assert!(!source.has_pending().unwrap());
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn lines_are_joined_across_reads() {
        let mut source = SerialLineSource::new(ScriptedPort::boxed(vec![
            Ok(b"TAB".to_vec()),
            Ok(b"LE\r\n1 2".to_vec()),
            Ok(b" 3\n".to_vec()),
        ]));

        assert!(source.has_pending().unwrap());
        assert_eq!(source.next_line().unwrap().as_deref(), Some("TABLE"));
        assert!(source.has_pending().unwrap());
        assert_eq!(source.next_line().unwrap().as_deref(), Some("1 2 3"));
        assert_eq!(source.next_line().unwrap(), None);
        assert_eq!(source.port_name().as_deref(), Some("scripted"));
    }

    #[test]
    fn line_without_ending_is_discarded_when_buffer_fills() {
        let mut source = SerialLineSource::new(ScriptedPort::boxed(vec![
            Ok(vec![b'x'; SERIAL_RX_BUFFER_SIZE]),
            Ok(b"TABLE\n".to_vec()),
        ]));

        assert_eq!(source.next_line().unwrap().as_deref(), Some("TABLE"));
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn read_errors_other_than_timeout_propagate() {
        let mut source = SerialLineSource::new(ScriptedPort::boxed(vec![Err(IoError::new(
            ErrorKind::BrokenPipe,
            "device unplugged",
        ))]));

        let err = source.next_line().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }
}
