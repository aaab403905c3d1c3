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
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

pub const DEFAULT_THRESHOLD: i32 = 20;
pub const DEFAULT_MAX_FORCE: i32 = 600;

/// Maps baseline-subtracted readings onto a blue to red ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapScale {
    threshold: i32,
    max_force: i32,
}

impl HeatmapScale {
    /// `max_force` is raised to at least 1.
    pub fn new(threshold: i32, max_force: i32) -> Self {
        Self {
            threshold,
            max_force: max_force.max(1),
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn max_force(&self) -> i32 {
        self.max_force
    }

    /// Delta above baseline, zero below the threshold, capped at `max_force`.
    pub fn value(&self, raw: i32, baseline: i32) -> i32 {
        let delta = raw.saturating_sub(baseline);
        if delta < self.threshold {
            return 0;
        }
        delta.clamp(0, self.max_force)
    }

    pub fn intensity(&self, raw: i32, baseline: i32) -> u8 {
        let value = i64::from(self.value(raw, baseline));
        let max_force = i64::from(self.max_force);
        ((value * 255 + max_force / 2) / max_force) as u8
    }

    pub fn color(&self, raw: i32, baseline: i32) -> Rgb888 {
        let intensity = self.intensity(raw, baseline);
        Rgb888::new(intensity, 0, 255 - intensity)
    }
}

impl Default for HeatmapScale {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_MAX_FORCE)
    }
}

/// Paint each cell as a square of `cell_size - 1` pixels, leaving a one pixel
/// grid line. Cells of size 1 are painted without a gap.
pub fn draw_heatmap<D, const ROWS: usize, const COLS: usize>(
    target: &mut D,
    frame: &Grid<ROWS, COLS>,
    baseline: &Grid<ROWS, COLS>,
    scale: &HeatmapScale,
    cell_size: u32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let side = if cell_size > 1 { cell_size - 1 } else { 1 };

    for (row, col, raw) in frame.cells() {
        let color = scale.color(raw, baseline.get(row, col));
        let top_left = Point::new((col as u32 * cell_size) as i32, (row as u32 * cell_size) as i32);
        target.fill_solid(&Rectangle::new(top_left, Size::new(side, side)), color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::collections::HashMap;

    struct PixelLog {
        size: Size,
        pixels: HashMap<(i32, i32), Rgb888>,
    }

    impl PixelLog {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: Size::new(width, height),
                pixels: HashMap::new(),
            }
        }
    }

    impl OriginDimensions for PixelLog {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for PixelLog {
        type Color = Rgb888;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                self.pixels.insert((point.x, point.y), color);
            }
            Ok(())
        }
    }

    const BLUE: Rgb888 = Rgb888::new(0, 0, 255);
    const RED: Rgb888 = Rgb888::new(255, 0, 0);

    #[test]
    fn zero_delta_is_blue() {
        let scale = HeatmapScale::default();
        assert_eq!(scale.color(300, 300), BLUE);
    }

    #[test]
    fn max_force_and_beyond_is_red() {
        let scale = HeatmapScale::default();
        assert_eq!(scale.color(100 + 600, 100), RED);
        assert_eq!(scale.color(100 + 5000, 100), RED);
    }

    #[test]
    fn below_threshold_clamps_to_zero() {
        let scale = HeatmapScale::default();
        assert_eq!(scale.color(100 + 19, 100), BLUE);
        assert_eq!(scale.value(100 + 20, 100), 20);
        assert_eq!(scale.color(50, 100), BLUE);
    }

    #[test]
    fn intensity_is_rounded() {
        let scale = HeatmapScale::default();
        // 300 / 600 * 255 = 127.5
        assert_eq!(scale.intensity(300, 0), 128);
        // 100 / 600 * 255 = 42.5
        assert_eq!(scale.intensity(100, 0), 43);
        // 21 / 600 * 255 = 8.925
        assert_eq!(scale.intensity(21, 0), 9);
        assert_eq!(scale.color(300, 0), Rgb888::new(128, 0, 127));
    }

    #[test]
    fn draws_cells_with_grid_gap() {
        let frame = Grid::<2, 2>::from_rows([[0, 600], [0, 0]]);
        let baseline = Grid::<2, 2>::new();
        let mut target = PixelLog::new(8, 8);

        draw_heatmap(&mut target, &frame, &baseline, &HeatmapScale::default(), 4).unwrap();

        assert_eq!(target.pixels.get(&(0, 0)), Some(&BLUE));
        assert_eq!(target.pixels.get(&(4, 0)), Some(&RED));
        assert_eq!(target.pixels.get(&(6, 2)), Some(&RED));
        // gap column and row
        assert_eq!(target.pixels.get(&(3, 0)), None);
        assert_eq!(target.pixels.get(&(0, 3)), None);
        assert_eq!(target.pixels.len(), 4 * 9);
    }

    #[test]
    fn single_pixel_cells_have_no_gap() {
        let frame = Grid::<2, 3>::new();
        let mut target = PixelLog::new(3, 2);

        draw_heatmap(&mut target, &frame, &Grid::new(), &HeatmapScale::default(), 1).unwrap();

        assert_eq!(target.pixels.len(), 6);
    }
}
