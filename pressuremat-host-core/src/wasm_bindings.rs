// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.

use crate::controller::{ControllerConfig, PollOutcome};
use crate::heatmap::HeatmapScale;
use crate::line_buffer::{LineBuffer, LineBufferError};
use crate::{MAT_COLS, MAT_ROWS, PressureMatController};
use embedded_graphics::prelude::RgbColor;
use wasm_bindgen::prelude::*;

const WASM_BUFFER_SIZE: usize = 8192;

#[wasm_bindgen]
pub fn init_logging() {
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace).message_on_new_line());
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct WasmMatViewer {
    controller: PressureMatController,
    rx_buffer: LineBuffer<WASM_BUFFER_SIZE>,
}

#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct WasmCalibrationProgress {
    pub collected: u32,
    pub target: u32,
}

#[wasm_bindgen]
impl WasmMatViewer {
    /// Create a viewer that calibrates over `samples` frames
    #[wasm_bindgen(constructor)]
    pub fn new(samples: u32, threshold: i32, max_force: i32) -> WasmMatViewer {
        let config = ControllerConfig {
            calibration_samples: samples,
            scale: HeatmapScale::new(threshold, max_force),
            ..ControllerConfig::default()
        };
        WasmMatViewer {
            controller: PressureMatController::new(config),
            rx_buffer: LineBuffer::new(),
        }
    }

    /// Feed bytes read from Web Serial. Returns true when the heatmap changed.
    pub fn handle_incoming_bytes(&mut self, incoming_bytes: &[u8]) -> Result<bool, JsValue> {
        self.rx_buffer.extend_or_discard(incoming_bytes).map_err(|e| match e {
            LineBufferError::RxBufferNotEnoughSpace => JsValue::from_str("RX buffer not enough space"),
        })?;

        let mut updated = false;
        while self.rx_buffer.has_complete_line() {
            let outcome = match self.controller.poll(&mut self.rx_buffer) {
                Ok(outcome) => outcome,
                Err(never) => match never {},
            };
            log::trace!("Poll outcome: {:?}", outcome);
            updated |= matches!(outcome, PollOutcome::NewFrame | PollOutcome::CalibrationComplete);
        }
        Ok(updated)
    }

    pub fn is_calibrated(&self) -> bool {
        self.controller.is_calibrated()
    }

    pub fn get_progress(&self) -> Option<WasmCalibrationProgress> {
        self.controller
            .calibration_progress()
            .map(|progress| WasmCalibrationProgress {
                collected: progress.collected,
                target: progress.target,
            })
    }

    /// Row-major RGB triples, one per cell
    pub fn heatmap_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(MAT_ROWS * MAT_COLS * 3);
        for row in 0..MAT_ROWS {
            for col in 0..MAT_COLS {
                let color = self.controller.color_at(row, col);
                rgb.extend_from_slice(&[color.r(), color.g(), color.b()]);
            }
        }
        rgb
    }

    pub fn rows(&self) -> usize {
        MAT_ROWS
    }

    pub fn cols(&self) -> usize {
        MAT_COLS
    }
}
