//! The bingo board: a square grid of cells pairing a garment part with a
//! defect type.
//!
//! Placement is lenient (any pair, last write wins) and marking is strict
//! (complete cell with a compatible pair). A marked cell is terminal: it
//! can no longer be overwritten, cleared or moved.
//!
//! Cell identity is positional. Every cell's id is `"{row}-{col}"` and is
//! recomputed whenever contents move between positions.

use serde::{Deserialize, Serialize};

use crate::catalog::{DefectType, GarmentPart};
use crate::compatibility::CompatibilityRules;
use crate::error::CoreError;
use crate::types::{ActorId, Timestamp};

/// Board size used by the standard game.
pub const DEFAULT_BOARD_SIZE: usize = 5;

/// Largest board accepted; keeps every operation trivially cheap.
pub const MAX_BOARD_SIZE: usize = 25;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: String,
    garment_part: Option<GarmentPart>,
    defect_type: Option<DefectType>,
    marked: bool,
    validated_by: Option<ActorId>,
    validated_at: Option<Timestamp>,
}

impl Cell {
    fn empty(row: usize, col: usize) -> Self {
        Self {
            id: cell_id(row, col),
            garment_part: None,
            defect_type: None,
            marked: false,
            validated_by: None,
            validated_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn garment_part(&self) -> Option<&GarmentPart> {
        self.garment_part.as_ref()
    }

    pub fn defect_type(&self) -> Option<&DefectType> {
        self.defect_type.as_ref()
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn validated_by(&self) -> Option<&str> {
        self.validated_by.as_deref()
    }

    pub fn validated_at(&self) -> Option<Timestamp> {
        self.validated_at
    }

    /// A cell is complete once both a garment part and a defect type are placed.
    pub fn is_complete(&self) -> bool {
        self.garment_part.is_some() && self.defect_type.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.garment_part.is_none() && self.defect_type.is_none()
    }

    fn pair_feedback(&self, rules: &CompatibilityRules) -> PairFeedback {
        match (&self.garment_part, &self.defect_type) {
            (Some(part), Some(defect)) if rules.is_valid_pair(part, defect) => PairFeedback::Valid,
            (Some(_), Some(_)) => PairFeedback::Invalid,
            _ => PairFeedback::Incomplete,
        }
    }
}

/// Positional cell id.
pub fn cell_id(row: usize, col: usize) -> String {
    format!("{row}-{col}")
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Advisory feedback on a cell's pair after a placement. Never blocks placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairFeedback {
    /// One of the two fields is still missing.
    Incomplete,
    /// Both fields present and the pair is a known-good combination.
    Valid,
    /// Both fields present but the compatibility rules reject the pair.
    Invalid,
}

/// Result of a placement trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlacementOutcome {
    Placed { feedback: PairFeedback },
    /// The target cell is already marked and keeps its pair.
    CellLocked,
}

/// Result of a mark trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    /// The cell transitioned to marked.
    Marked,
    /// The cell was already marked; nothing changed.
    AlreadyMarked,
    /// Missing garment part or defect type.
    Incomplete,
    /// The placed pair fails the compatibility rules.
    InvalidPair,
}

impl MarkOutcome {
    /// `true` only when this call marked the cell.
    pub fn is_success(self) -> bool {
        matches!(self, MarkOutcome::Marked)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A `size x size` grid stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct BoardRepr {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<BoardRepr> for Board {
    type Error = CoreError;

    fn try_from(repr: BoardRepr) -> Result<Self, Self::Error> {
        validate_board_size(repr.size)?;
        if repr.cells.len() != repr.size * repr.size {
            return Err(CoreError::Validation(format!(
                "A {0}x{0} board needs {1} cells, got {2}",
                repr.size,
                repr.size * repr.size,
                repr.cells.len()
            )));
        }
        let mut cells = repr.cells;
        for (index, cell) in cells.iter_mut().enumerate() {
            if cell.marked && !cell.is_complete() {
                return Err(CoreError::Validation(format!(
                    "Marked cell {} is missing its pair",
                    cell.id
                )));
            }
            if cell.marked != cell.validated_by.is_some()
                || cell.marked != cell.validated_at.is_some()
            {
                return Err(CoreError::Validation(format!(
                    "Cell {} has validation metadata that does not match its mark",
                    cell.id
                )));
            }
            cell.id = cell_id(index / repr.size, index % repr.size);
        }
        Ok(Self {
            size: repr.size,
            cells,
        })
    }
}

impl Board {
    /// Create an empty board.
    pub fn new(size: usize) -> Result<Self, CoreError> {
        validate_board_size(size)?;
        let cells = (0..size * size)
            .map(|index| Cell::empty(index / size, index % size))
            .collect();
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<&Cell, CoreError> {
        let index = self.index(row, col)?;
        Ok(&self.cells[index])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn place_garment_part(
        &mut self,
        row: usize,
        col: usize,
        part: GarmentPart,
        rules: &CompatibilityRules,
    ) -> Result<PlacementOutcome, CoreError> {
        let cell = self.cell_mut(row, col)?;
        if cell.marked {
            return Ok(PlacementOutcome::CellLocked);
        }
        cell.garment_part = Some(part);
        Ok(PlacementOutcome::Placed {
            feedback: cell.pair_feedback(rules),
        })
    }

    pub fn place_defect_type(
        &mut self,
        row: usize,
        col: usize,
        defect: DefectType,
        rules: &CompatibilityRules,
    ) -> Result<PlacementOutcome, CoreError> {
        let cell = self.cell_mut(row, col)?;
        if cell.marked {
            return Ok(PlacementOutcome::CellLocked);
        }
        cell.defect_type = Some(defect);
        Ok(PlacementOutcome::Placed {
            feedback: cell.pair_feedback(rules),
        })
    }

    /// Remove placed values from an unmarked cell. Returns `false` for a marked cell.
    pub fn clear_cell(&mut self, row: usize, col: usize) -> Result<bool, CoreError> {
        let cell = self.cell_mut(row, col)?;
        if cell.marked {
            return Ok(false);
        }
        *cell = Cell::empty(row, col);
        Ok(true)
    }

    /// Exchange the contents of two unmarked cells, recomputing both ids.
    ///
    /// Returns `false` (and changes nothing) when either cell is marked.
    pub fn swap_cells(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<bool, CoreError> {
        let a = self.index(from.0, from.1)?;
        let b = self.index(to.0, to.1)?;
        if self.cells[a].marked || self.cells[b].marked {
            return Ok(false);
        }
        self.cells.swap(a, b);
        self.cells[a].id = cell_id(from.0, from.1);
        self.cells[b].id = cell_id(to.0, to.1);
        Ok(true)
    }

    /// Mark a cell as validated now. See [`Board::mark_cell_at`].
    pub fn mark_cell(
        &mut self,
        row: usize,
        col: usize,
        validator: &str,
        rules: &CompatibilityRules,
    ) -> Result<MarkOutcome, CoreError> {
        self.mark_cell_at(row, col, validator, rules, chrono::Utc::now())
    }

    /// Mark a cell as validated at the given time.
    ///
    /// Incomplete cells and incompatible pairs leave the board untouched.
    /// Marking an already marked cell keeps the original validator and time.
    pub fn mark_cell_at(
        &mut self,
        row: usize,
        col: usize,
        validator: &str,
        rules: &CompatibilityRules,
        at: Timestamp,
    ) -> Result<MarkOutcome, CoreError> {
        let cell = self.cell_mut(row, col)?;
        if cell.marked {
            return Ok(MarkOutcome::AlreadyMarked);
        }
        match cell.pair_feedback(rules) {
            PairFeedback::Incomplete => Ok(MarkOutcome::Incomplete),
            PairFeedback::Invalid => Ok(MarkOutcome::InvalidPair),
            PairFeedback::Valid => {
                cell.marked = true;
                cell.validated_by = Some(validator.to_string());
                cell.validated_at = Some(at);
                Ok(MarkOutcome::Marked)
            }
        }
    }

    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.marked).count()
    }

    /// `true` when every cell is marked.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.marked)
    }

    /// Percentage of marked cells, rounded half up, in `0..=100`.
    pub fn completion_percentage(&self) -> u8 {
        completion_percentage(self.marked_count(), self.cells.len())
    }

    /// Replace the board with a fresh empty one of the same size.
    pub fn reset(&mut self) {
        let size = self.size;
        self.cells = (0..size * size)
            .map(|index| Cell::empty(index / size, index % size))
            .collect();
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, CoreError> {
        if row >= self.size || col >= self.size {
            return Err(CoreError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        Ok(row * self.size + col)
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut Cell, CoreError> {
        let index = self.index(row, col)?;
        Ok(&mut self.cells[index])
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate a board size: `1..=MAX_BOARD_SIZE`.
pub fn validate_board_size(size: usize) -> Result<(), CoreError> {
    if size == 0 || size > MAX_BOARD_SIZE {
        return Err(CoreError::Validation(format!(
            "Board size must be between 1 and {MAX_BOARD_SIZE}, got {size}"
        )));
    }
    Ok(())
}

/// `round(100 * marked / total)` with halves rounded up, in integer arithmetic.
pub fn completion_percentage(marked: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let marked = marked.min(total);
    ((200 * marked + total) / (2 * total)) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
