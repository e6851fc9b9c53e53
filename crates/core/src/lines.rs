//! Completed-line ("bingo") detection.
//!
//! A line is complete when every cell on it is complete and marked. Since
//! marks are terminal, detection is derived purely from board state and a
//! completed line stays complete for the life of the board.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::Board;

/// Index of the top-left to bottom-right diagonal.
pub const MAIN_DIAGONAL: usize = 1;

/// Index of the top-right to bottom-left diagonal.
pub const ANTI_DIAGONAL: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Row,
    Column,
    Diagonal,
}

/// A completed row, column or diagonal.
///
/// Ordering is rows ascending, then columns ascending, then diagonal 1,
/// then diagonal 2, which is also the order new lines are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompletedLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub index: usize,
}

impl CompletedLine {
    pub fn row(index: usize) -> Self {
        Self {
            kind: LineKind::Row,
            index,
        }
    }

    pub fn column(index: usize) -> Self {
        Self {
            kind: LineKind::Column,
            index,
        }
    }

    pub fn main_diagonal() -> Self {
        Self {
            kind: LineKind::Diagonal,
            index: MAIN_DIAGONAL,
        }
    }

    pub fn anti_diagonal() -> Self {
        Self {
            kind: LineKind::Diagonal,
            index: ANTI_DIAGONAL,
        }
    }

    /// Coordinates of the cells on this line for a board of `size`.
    pub fn positions(&self, size: usize) -> Vec<(usize, usize)> {
        match (self.kind, self.index) {
            (LineKind::Row | LineKind::Column, index) if index >= size => Vec::new(),
            (LineKind::Row, row) => (0..size).map(|col| (row, col)).collect(),
            (LineKind::Column, col) => (0..size).map(|row| (row, col)).collect(),
            (LineKind::Diagonal, MAIN_DIAGONAL) => (0..size).map(|i| (i, i)).collect(),
            (LineKind::Diagonal, ANTI_DIAGONAL) => {
                (0..size).map(|i| (i, size - 1 - i)).collect()
            }
            (LineKind::Diagonal, _) => Vec::new(),
        }
    }
}

/// Every line a board of `size` has, in reporting order.
pub fn all_lines(size: usize) -> Vec<CompletedLine> {
    let mut lines = Vec::with_capacity(2 * size + 2);
    lines.extend((0..size).map(CompletedLine::row));
    lines.extend((0..size).map(CompletedLine::column));
    lines.push(CompletedLine::main_diagonal());
    lines.push(CompletedLine::anti_diagonal());
    lines
}

/// Whether every cell on `line` is complete and marked.
pub fn is_line_complete(board: &Board, line: &CompletedLine) -> bool {
    let cells = board.cells();
    let size = board.size();
    let positions = line.positions(size);
    !positions.is_empty()
        && positions.into_iter().all(|(row, col)| {
            let cell = &cells[row * size + col];
            cell.is_marked() && cell.is_complete()
        })
}

/// Lines complete on `board` that are not yet in `previously_completed`.
///
/// The result is ordered rows, columns, diagonal 1, diagonal 2. Callers
/// merge it into their accumulated set.
pub fn detect_completed_lines(
    board: &Board,
    previously_completed: &BTreeSet<CompletedLine>,
) -> Vec<CompletedLine> {
    all_lines(board.size())
        .into_iter()
        .filter(|line| !previously_completed.contains(line))
        .filter(|line| is_line_complete(board, line))
        .collect()
}
