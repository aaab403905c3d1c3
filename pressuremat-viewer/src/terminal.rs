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

use core::convert::Infallible;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use std::io::{Result as IoResult, Write};

const CURSOR_HOME: &str = "\x1b[H";
const CLEAR_SCREEN: &str = "\x1b[2J";
const RESET_COLORS: &str = "\x1b[0m";

/// A draw target backed by a pixel buffer, shown on a truecolor terminal
/// with each pixel as two character cells.
pub(crate) struct TerminalCanvas {
    size: Size,
    pixels: Vec<Rgb888>,
}

impl TerminalCanvas {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (u32::try_from(point.x).ok()?, u32::try_from(point.y).ok()?);
        if x < self.size.width && y < self.size.height {
            Some((y * self.size.width + x) as usize)
        } else {
            None
        }
    }

    pub(crate) fn clear_screen<W: Write>(out: &mut W) -> IoResult<()> {
        write!(out, "{}{}", CLEAR_SCREEN, CURSOR_HOME)?;
        out.flush()
    }

    pub(crate) fn render<W: Write>(&self, out: &mut W) -> IoResult<()> {
        write!(out, "{}", CURSOR_HOME)?;
        for row in self.pixels.chunks(self.size.width as usize) {
            for pixel in row {
                write!(out, "\x1b[48;2;{};{};{}m  ", pixel.r(), pixel.g(), pixel.b())?;
            }
            writeln!(out, "{}", RESET_COLORS)?;
        }
        out.flush()
    }
}

impl OriginDimensions for TerminalCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for TerminalCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }
}
