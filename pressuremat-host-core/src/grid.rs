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

/// A fixed-size grid of readings, one per sensor cell. Used for both frames
/// and baselines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<const ROWS: usize, const COLS: usize> {
    cells: [[i32; COLS]; ROWS],
}

impl<const ROWS: usize, const COLS: usize> Grid<ROWS, COLS> {
    pub fn new() -> Self {
        Self {
            cells: [[0; COLS]; ROWS],
        }
    }

    pub fn from_rows(cells: [[i32; COLS]; ROWS]) -> Self {
        Self { cells }
    }

    pub fn filled(value: i32) -> Self {
        Self {
            cells: [[value; COLS]; ROWS],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.cells[row][col]
    }

    pub fn set_row(&mut self, row: usize, values: [i32; COLS]) {
        self.cells[row] = values;
    }

    pub fn rows(&self) -> &[[i32; COLS]; ROWS] {
        &self.cells
    }

    /// Iterates `(row, col, value)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, v)| (r, c, *v)))
    }

    pub fn to_nested_vec(&self) -> Vec<Vec<i32>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl<const ROWS: usize, const COLS: usize> Default for Grid<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_row_major() {
        let grid = Grid::<2, 3>::from_rows([[1, 2, 3], [4, 5, 6]]);
        let order: Vec<_> = grid.cells().collect();

        assert_eq!(order[0], (0, 0, 1));
        assert_eq!(order[2], (0, 2, 3));
        assert_eq!(order[3], (1, 0, 4));
        assert_eq!(grid.to_nested_vec(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }
}
