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

mod util;

pub mod calibration;
pub mod controller;
pub mod frame;
pub mod grid;
pub mod heatmap;
pub mod line_buffer;

#[cfg(not(target_arch = "wasm32"))]
pub mod serial;

#[cfg(target_arch = "wasm32")]
pub mod wasm_bindings;

pub use calibration::{Calibration, CalibrationProgress};
pub use controller::{ControllerConfig, MatController, PollOutcome};
pub use frame::{FRAME_MARKER, FrameAssembler, LineOutcome, RowError};
pub use grid::Grid;
pub use heatmap::{HeatmapScale, draw_heatmap};
pub use line_buffer::{LineBuffer, LineBufferError, LineSource};

/// Rows in a frame from the 32x32 mat.
pub const MAT_ROWS: usize = 32;
/// Columns in a frame from the 32x32 mat.
pub const MAT_COLS: usize = 32;

pub type MatGrid = Grid<MAT_ROWS, MAT_COLS>;
pub type MatFrameAssembler = FrameAssembler<MAT_ROWS, MAT_COLS>;
pub type PressureMatController = MatController<MAT_ROWS, MAT_COLS>;
