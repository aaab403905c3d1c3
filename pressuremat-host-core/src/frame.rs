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
use crate::line_buffer::LineSource;

/// Line that announces the start of a frame.
pub const FRAME_MARKER: &str = "TABLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowError {
    WrongColumnCount { expected: usize, found: usize },
    InvalidToken,
    /// A frame marker arrived before the frame was complete
    UnexpectedMarker,
}

/// Parse one row of exactly `COLS` whitespace-separated integers.
pub fn parse_row<const COLS: usize>(line: &str) -> Result<[i32; COLS], RowError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != COLS {
        return Err(RowError::WrongColumnCount {
            expected: COLS,
            found: tokens.len(),
        });
    }

    let mut row = [0i32; COLS];
    for (cell, token) in row.iter_mut().zip(tokens) {
        *cell = token.parse().map_err(|_| RowError::InvalidToken)?;
    }
    Ok(row)
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome<const ROWS: usize, const COLS: usize> {
    /// Not part of a frame
    Ignored,
    FrameStarted,
    RowAccepted,
    /// The frame being collected was dropped
    FrameDiscarded(RowError),
    FrameComplete(Box<Grid<ROWS, COLS>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    WaitingForMarker,
    CollectingRows { next_row: usize },
}

/// Builds frames from lines fed one at a time.
pub struct FrameAssembler<const ROWS: usize, const COLS: usize> {
    state: AssemblerState,
    pending: Box<Grid<ROWS, COLS>>,
}

impl<const ROWS: usize, const COLS: usize> FrameAssembler<ROWS, COLS> {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::WaitingForMarker,
            pending: Box::new(Grid::new()),
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, AssemblerState::CollectingRows { .. })
    }

    pub fn push_line(&mut self, line: &str) -> LineOutcome<ROWS, COLS> {
        let line = line.trim();

        match self.state {
            AssemblerState::WaitingForMarker => {
                if line == FRAME_MARKER {
                    self.state = AssemblerState::CollectingRows { next_row: 0 };
                    LineOutcome::FrameStarted
                } else {
                    LineOutcome::Ignored
                }
            }
            AssemblerState::CollectingRows { next_row } => {
                if line == FRAME_MARKER {
                    // The interrupted frame is lost, the new one starts here
                    log::trace!("Marker after {} rows, restarting frame", next_row);
                    self.state = AssemblerState::CollectingRows { next_row: 0 };
                    return LineOutcome::FrameDiscarded(RowError::UnexpectedMarker);
                }

                let row = match parse_row::<COLS>(line) {
                    Ok(row) => row,
                    Err(e) => {
                        log::trace!("Discarding frame at row {}: {:?}", next_row, e);
                        self.state = AssemblerState::WaitingForMarker;
                        return LineOutcome::FrameDiscarded(e);
                    }
                };

                self.pending.set_row(next_row, row);
                if next_row + 1 == ROWS {
                    self.state = AssemblerState::WaitingForMarker;
                    let frame = core::mem::replace(&mut self.pending, Box::new(Grid::new()));
                    LineOutcome::FrameComplete(frame)
                } else {
                    self.state = AssemblerState::CollectingRows {
                        next_row: next_row + 1,
                    };
                    LineOutcome::RowAccepted
                }
            }
        }
    }

    /// Scan buffered input for the next complete frame.
    ///
    /// Lines are only pulled while the source reports pending input, except
    /// that once a marker has been seen the rows are read even if they have
    /// not arrived yet. Malformed frames are dropped and the scan continues.
    pub fn read_frame<S>(&mut self, source: &mut S) -> Result<Option<Box<Grid<ROWS, COLS>>>, S::Error>
    where
        S: LineSource,
    {
        loop {
            if !self.is_collecting() && !source.has_pending()? {
                return Ok(None);
            }

            let Some(line) = source.next_line()? else {
                return Ok(None);
            };

            if let LineOutcome::FrameComplete(frame) = self.push_line(&line) {
                return Ok(Some(frame));
            }
        }
    }
}

impl<const ROWS: usize, const COLS: usize> Default for FrameAssembler<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::collections::VecDeque;

    /// In-memory source where every queued line counts as pending.
    pub(crate) struct ScriptedLines {
        lines: VecDeque<String>,
        pub(crate) reads: usize,
    }

    impl ScriptedLines {
        pub(crate) fn new<I, L>(lines: I) -> Self
        where
            I: IntoIterator<Item = L>,
            L: Into<String>,
        {
            Self {
                lines: lines.into_iter().map(Into::into).collect(),
                reads: 0,
            }
        }

        pub(crate) fn push<L: Into<String>>(&mut self, line: L) {
            self.lines.push_back(line.into());
        }

        pub(crate) fn remaining(&self) -> usize {
            self.lines.len()
        }
    }

    impl LineSource for ScriptedLines {
        type Error = Infallible;

        fn has_pending(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.lines.is_empty())
        }

        fn next_line(&mut self) -> Result<Option<String>, Self::Error> {
            self.reads += 1;
            Ok(self.lines.pop_front())
        }
    }

    pub(crate) fn frame_lines<const ROWS: usize, const COLS: usize>(value: i32) -> Vec<String> {
        let row = vec![value.to_string(); COLS].join(" ");
        core::iter::once(FRAME_MARKER.to_string())
            .chain(core::iter::repeat(row).take(ROWS))
            .collect()
    }

    #[test]
    fn parse_row_checks_shape_and_tokens() {
        assert_eq!(parse_row::<3>("1 -2   3"), Ok([1, -2, 3]));
        assert_eq!(
            parse_row::<3>("1 2"),
            Err(RowError::WrongColumnCount { expected: 3, found: 2 })
        );
        assert_eq!(parse_row::<3>("1 abc 3"), Err(RowError::InvalidToken));
        assert_eq!(
            parse_row::<3>(""),
            Err(RowError::WrongColumnCount { expected: 3, found: 0 })
        );
    }

    #[test]
    fn full_zero_frame_is_accepted() {
        let mut source = ScriptedLines::new(frame_lines::<32, 32>(0));
        let mut assembler = FrameAssembler::<32, 32>::new();

        let frame = assembler.read_frame(&mut source).unwrap().unwrap();
        assert_eq!(*frame, Grid::<32, 32>::new());
    }

    #[test]
    fn values_land_in_row_column_order() {
        let mut source = ScriptedLines::new(["noise", "TABLE", "1 2 3", "4 5 6"]);
        let mut assembler = FrameAssembler::<2, 3>::new();

        let frame = assembler.read_frame(&mut source).unwrap().unwrap();
        assert_eq!(frame.rows(), &[[1, 2, 3], [4, 5, 6]]);
    }

    #[test]
    fn short_row_discards_frame() {
        let mut source = ScriptedLines::new(["TABLE", "1 2 3", "4 5"]);
        let mut assembler = FrameAssembler::<2, 3>::new();

        assert_eq!(assembler.read_frame(&mut source).unwrap(), None);
        assert!(!assembler.is_collecting());
    }

    #[test]
    fn non_numeric_token_discards_frame() {
        let mut lines = vec!["TABLE".to_string(), "abc 0 0".to_string()];
        lines.extend(core::iter::repeat("0 0 0".to_string()).take(31));
        let mut source = ScriptedLines::new(lines);
        let mut assembler = FrameAssembler::<32, 3>::new();

        assert_eq!(assembler.read_frame(&mut source).unwrap(), None);
    }

    #[test]
    fn scan_continues_after_bad_frame() {
        let mut source = ScriptedLines::new(["TABLE", "x y", "TABLE", "7 8", "9 10"]);
        let mut assembler = FrameAssembler::<2, 2>::new();

        let frame = assembler.read_frame(&mut source).unwrap().unwrap();
        assert_eq!(frame.rows(), &[[7, 8], [9, 10]]);
    }

    #[test]
    fn marker_mid_frame_restarts_collection() {
        let mut assembler = FrameAssembler::<2, 2>::new();
        assert_eq!(assembler.push_line("TABLE"), LineOutcome::FrameStarted);
        assert_eq!(assembler.push_line("1 1"), LineOutcome::RowAccepted);
        assert_eq!(
            assembler.push_line("TABLE"),
            LineOutcome::FrameDiscarded(RowError::UnexpectedMarker)
        );
        assert_eq!(assembler.push_line("2 2"), LineOutcome::RowAccepted);
        assert!(matches!(assembler.push_line("3 3"), LineOutcome::FrameComplete(_)));
    }

    #[test]
    fn partial_frame_completes_on_next_call() {
        let mut source = ScriptedLines::new(["TABLE", "1 2"]);
        let mut assembler = FrameAssembler::<2, 2>::new();

        assert_eq!(assembler.read_frame(&mut source).unwrap(), None);
        assert!(assembler.is_collecting());

        source.push("3 4");
        let frame = assembler.read_frame(&mut source).unwrap().unwrap();
        assert_eq!(frame.rows(), &[[1, 2], [3, 4]]);
    }

    #[test]
    fn stray_rows_before_marker_are_ignored() {
        let mut assembler = FrameAssembler::<1, 2>::new();
        assert_eq!(assembler.push_line("5 5"), LineOutcome::Ignored);
        assert_eq!(assembler.push_line("  TABLE "), LineOutcome::FrameStarted);
    }
}
