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

use crate::calibration::{Calibration, CalibrationProgress, DEFAULT_CALIBRATION_SAMPLES};
use crate::frame::{FrameAssembler, LineOutcome};
use crate::grid::Grid;
use crate::heatmap::{HeatmapScale, draw_heatmap};
use crate::line_buffer::LineSource;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::DrawTarget;

/// Lines read per calibration poll. Enough for one marker plus a 32 row frame.
pub const DEFAULT_CALIBRATION_STEP_BUDGET: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub calibration_samples: u32,
    pub calibration_step_budget: usize,
    pub scale: HeatmapScale,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            calibration_samples: DEFAULT_CALIBRATION_SAMPLES,
            calibration_step_budget: DEFAULT_CALIBRATION_STEP_BUDGET,
            scale: HeatmapScale::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Calibrating(CalibrationProgress),
    CalibrationComplete,
    NewFrame,
    NoNewFrame,
}

#[derive(Debug)]
enum ControllerState<const ROWS: usize, const COLS: usize> {
    Calibrating(Calibration<ROWS, COLS>),
    Running,
}

/// Owns the latest frame and the baseline and drives calibration.
pub struct MatController<const ROWS: usize, const COLS: usize> {
    config: ControllerConfig,
    state: ControllerState<ROWS, COLS>,
    assembler: FrameAssembler<ROWS, COLS>,
    frame: Box<Grid<ROWS, COLS>>,
    baseline: Box<Grid<ROWS, COLS>>,
}

impl<const ROWS: usize, const COLS: usize> MatController<ROWS, COLS> {
    /// Starts in calibration.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: ControllerState::Calibrating(Calibration::new(config.calibration_samples)),
            assembler: FrameAssembler::new(),
            frame: Box::new(Grid::new()),
            baseline: Box::new(Grid::new()),
        }
    }

    /// Starts running against a known baseline.
    pub fn with_baseline(config: ControllerConfig, baseline: Grid<ROWS, COLS>) -> Self {
        Self {
            config,
            state: ControllerState::Running,
            assembler: FrameAssembler::new(),
            frame: Box::new(Grid::new()),
            baseline: Box::new(baseline),
        }
    }

    pub fn poll<S>(&mut self, source: &mut S) -> Result<PollOutcome, S::Error>
    where
        S: LineSource,
    {
        match &mut self.state {
            ControllerState::Calibrating(calibration) => {
                for _ in 0..self.config.calibration_step_budget.max(1) {
                    // Calibration reads whether or not input is buffered
                    let Some(line) = source.next_line()? else {
                        break;
                    };

                    let LineOutcome::FrameComplete(frame) = self.assembler.push_line(&line) else {
                        continue;
                    };

                    let progress = calibration.add_sample(&frame);
                    self.frame = frame;
                    log::info!("Calibrating: {}/{}", progress.collected, progress.target);

                    if calibration.is_complete() {
                        self.baseline = Box::new(calibration.baseline());
                        self.state = ControllerState::Running;
                        log::info!("Calibration done");
                        return Ok(PollOutcome::CalibrationComplete);
                    }
                }
                Ok(PollOutcome::Calibrating(calibration.progress()))
            }
            ControllerState::Running => match self.assembler.read_frame(source)? {
                Some(frame) => {
                    self.frame = frame;
                    Ok(PollOutcome::NewFrame)
                }
                None => Ok(PollOutcome::NoNewFrame),
            },
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.state, ControllerState::Running)
    }

    /// `None` once calibration has finished.
    pub fn calibration_progress(&self) -> Option<CalibrationProgress> {
        match &self.state {
            ControllerState::Calibrating(calibration) => Some(calibration.progress()),
            ControllerState::Running => None,
        }
    }

    pub fn frame(&self) -> &Grid<ROWS, COLS> {
        &self.frame
    }

    pub fn baseline(&self) -> &Grid<ROWS, COLS> {
        &self.baseline
    }

    pub fn scale(&self) -> &HeatmapScale {
        &self.config.scale
    }

    pub fn color_at(&self, row: usize, col: usize) -> Rgb888 {
        self.config
            .scale
            .color(self.frame.get(row, col), self.baseline.get(row, col))
    }

    pub fn draw<D>(&self, target: &mut D, cell_size: u32) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        draw_heatmap(target, &self.frame, &self.baseline, &self.config.scale, cell_size)
    }
}
