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

use crate::grid::Grid;

pub const DEFAULT_CALIBRATION_SAMPLES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationProgress {
    pub collected: u32,
    pub target: u32,
}

/// Accumulates frames into a per-cell baseline.
#[derive(Debug, Clone)]
pub struct Calibration<const ROWS: usize, const COLS: usize> {
    sums: Box<[[i64; COLS]; ROWS]>,
    progress: CalibrationProgress,
}

impl<const ROWS: usize, const COLS: usize> Calibration<ROWS, COLS> {
    /// A target of zero samples is raised to one.
    pub fn new(target_samples: u32) -> Self {
        Self {
            sums: Box::new([[0; COLS]; ROWS]),
            progress: CalibrationProgress {
                collected: 0,
                target: target_samples.max(1),
            },
        }
    }

    pub fn add_sample(&mut self, frame: &Grid<ROWS, COLS>) -> CalibrationProgress {
        if self.is_complete() {
            return self.progress;
        }

        for (row, col, value) in frame.cells() {
            self.sums[row][col] += i64::from(value);
        }
        self.progress.collected += 1;
        self.progress
    }

    pub fn progress(&self) -> CalibrationProgress {
        self.progress
    }

    pub fn is_complete(&self) -> bool {
        self.progress.collected >= self.progress.target
    }

    /// Per-cell mean of the samples so far, truncated towards zero.
    /// All zeros before the first sample.
    pub fn baseline(&self) -> Grid<ROWS, COLS> {
        let mut baseline = Grid::new();
        if self.progress.collected == 0 {
            return baseline;
        }

        let samples = i64::from(self.progress.collected);
        for (r, sums) in self.sums.iter().enumerate() {
            let mut row = [0i32; COLS];
            for (cell, sum) in row.iter_mut().zip(sums) {
                *cell = (sum / samples) as i32;
            }
            baseline.set_row(r, row);
        }
        baseline
    }
}
