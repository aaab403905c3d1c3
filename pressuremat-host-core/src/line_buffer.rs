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

use crate::util;
use circular_buffer::CircularBuffer;
use core::convert::Infallible;
use std::io::BufRead;

/// A source of text lines from the mat.
pub trait LineSource {
    type Error;

    /// Whether input is buffered right now, without blocking.
    fn has_pending(&mut self) -> Result<bool, Self::Error>;

    /// Next cleaned line. May block up to the source's timeout; `None` means
    /// no complete line arrived in time.
    fn next_line(&mut self) -> Result<Option<String>, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBufferError {
    RxBufferNotEnoughSpace,
}

/// Splits a byte stream into lines on `\n`.
pub struct LineBuffer<const BUFFER_SIZE: usize> {
    rx_buffer: CircularBuffer<BUFFER_SIZE, u8>,
}

impl<const BUFFER_SIZE: usize> LineBuffer<BUFFER_SIZE> {
    pub fn new() -> Self {
        Self {
            rx_buffer: CircularBuffer::<BUFFER_SIZE, u8>::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rx_buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx_buffer.is_empty()
    }

    pub fn free_space(&self) -> usize {
        self.rx_buffer.capacity() - self.rx_buffer.len()
    }

    pub fn clear(&mut self) {
        self.rx_buffer.clear();
    }

    pub fn extend(&mut self, incoming_bytes: &[u8]) -> Result<(), LineBufferError> {
        if incoming_bytes.len() > self.free_space() {
            return Err(LineBufferError::RxBufferNotEnoughSpace);
        }
        self.rx_buffer.extend_from_slice(incoming_bytes);
        Ok(())
    }

    /// Like `extend`, but when the bytes don't fit and the buffer holds no
    /// complete line, the unterminated data is dropped first.
    ///
    /// # Errors
    ///
    /// - `RxBufferNotEnoughSpace`: the bytes don't fit even after discarding
    pub fn extend_or_discard(&mut self, incoming_bytes: &[u8]) -> Result<(), LineBufferError> {
        if incoming_bytes.len() > self.free_space() && !self.has_complete_line() {
            log::warn!("Discarding {} bytes without a line ending", self.len());
            self.clear();
        }
        self.extend(incoming_bytes)
    }

    pub fn has_complete_line(&self) -> bool {
        self.rx_buffer.iter().any(|b| *b == b'\n')
    }

    pub fn pop_line(&mut self) -> Option<String> {
        self.rx_buffer.make_contiguous();
        let (buffered, _) = self.rx_buffer.as_slices();
        let line_end = buffered.iter().position(|b| *b == b'\n')?;
        let line = util::clean_line(&buffered[..line_end]);

        log::trace!("Consumed {} bytes from rx buffer", line_end + 1);
        self.rx_buffer.consume(line_end + 1);
        Some(line)
    }
}

impl<const BUFFER_SIZE: usize> Default for LineBuffer<BUFFER_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BUFFER_SIZE: usize> LineSource for LineBuffer<BUFFER_SIZE> {
    type Error = Infallible;

    fn has_pending(&mut self) -> Result<bool, Self::Error> {
        Ok(self.has_complete_line())
    }

    fn next_line(&mut self) -> Result<Option<String>, Self::Error> {
        Ok(self.pop_line())
    }
}
