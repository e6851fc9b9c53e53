//! One play session: a board, its compatibility rules and the accumulated
//! set of completed lines.
//!
//! The session is the single writer of its board. Hosts feed it placement
//! and mark triggers and render or persist the values it hands back; new
//! bingos and progress are returned from each call rather than pushed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{Board, MarkOutcome, PlacementOutcome};
use crate::catalog::{DefectType, GarmentPart};
use crate::compatibility::CompatibilityRules;
use crate::error::CoreError;
use crate::lines::{detect_completed_lines, is_line_complete, CompletedLine};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Reports and snapshots
// ---------------------------------------------------------------------------

/// What a mark trigger produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReport {
    pub outcome: MarkOutcome,
    /// Lines completed by this mark, in reporting order.
    pub new_lines: Vec<CompletedLine>,
    pub completion_percentage: u8,
}

/// Serialisable state of a session, suitable for verbatim persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub session_id: Uuid,
    pub started_at: Timestamp,
    pub board: Board,
    pub completed_lines: BTreeSet<CompletedLine>,
    pub completion_percentage: u8,
}

/// Game history entry written when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub session_id: Uuid,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub board_size: usize,
    pub marked_cells: usize,
    pub bingo_count: usize,
    pub completed_lines: Vec<CompletedLine>,
    pub completion_percentage: u8,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GameSession {
    id: Uuid,
    started_at: Timestamp,
    board: Board,
    rules: CompatibilityRules,
    completed: BTreeSet<CompletedLine>,
}

impl GameSession {
    /// Start a session on an empty board.
    pub fn new(size: usize, rules: CompatibilityRules) -> Result<Self, CoreError> {
        let board = Board::new(size)?;
        let session = Self {
            id: Uuid::new_v4(),
            started_at: chrono::Utc::now(),
            board,
            rules,
            completed: BTreeSet::new(),
        };
        tracing::info!(session_id = %session.id, size, "Bingo session started");
        Ok(session)
    }

    /// Restore a session from a persisted snapshot.
    ///
    /// Every recorded line must still be complete on the restored board and
    /// every marked cell must hold a pair the supplied rules accept. Lines
    /// that are complete on the board but missing from the snapshot are
    /// treated as already awarded, so they are never reported again.
    pub fn from_snapshot(
        snapshot: BoardSnapshot,
        rules: CompatibilityRules,
    ) -> Result<Self, CoreError> {
        let BoardSnapshot {
            session_id,
            started_at,
            board,
            completed_lines: mut completed,
            ..
        } = snapshot;

        if let Some(line) = completed
            .iter()
            .find(|line| !is_line_complete(&board, line))
        {
            return Err(CoreError::Validation(format!(
                "Snapshot records {:?} {} as complete but the board disagrees",
                line.kind, line.index
            )));
        }

        for cell in board.cells().iter().filter(|c| c.is_marked()) {
            let valid = match (cell.garment_part(), cell.defect_type()) {
                (Some(part), Some(defect)) => rules.is_valid_pair(part, defect),
                _ => false,
            };
            if !valid {
                return Err(CoreError::Validation(format!(
                    "Marked cell {} holds a pair the compatibility rules reject",
                    cell.id()
                )));
            }
        }

        let unrecorded = detect_completed_lines(&board, &completed);
        if !unrecorded.is_empty() {
            tracing::warn!(
                session_id = %session_id,
                lines = unrecorded.len(),
                "Snapshot was missing completed lines; recording them as awarded",
            );
            completed.extend(unrecorded);
        }

        Ok(Self {
            id: session_id,
            started_at,
            board,
            rules,
            completed,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// All lines completed so far, in reporting order.
    pub fn completed_lines(&self) -> &BTreeSet<CompletedLine> {
        &self.completed
    }

    pub fn bingo_count(&self) -> usize {
        self.completed.len()
    }

    pub fn completion_percentage(&self) -> u8 {
        self.board.completion_percentage()
    }

    pub fn place_garment_part(
        &mut self,
        row: usize,
        col: usize,
        part: GarmentPart,
    ) -> Result<PlacementOutcome, CoreError> {
        let outcome = self.board.place_garment_part(row, col, part, &self.rules)?;
        tracing::debug!(session_id = %self.id, row, col, ?outcome, "Garment part placed");
        Ok(outcome)
    }

    pub fn place_defect_type(
        &mut self,
        row: usize,
        col: usize,
        defect: DefectType,
    ) -> Result<PlacementOutcome, CoreError> {
        let outcome = self.board.place_defect_type(row, col, defect, &self.rules)?;
        tracing::debug!(session_id = %self.id, row, col, ?outcome, "Defect type placed");
        Ok(outcome)
    }

    pub fn clear_cell(&mut self, row: usize, col: usize) -> Result<bool, CoreError> {
        self.board.clear_cell(row, col)
    }

    pub fn swap_cells(
        &mut self,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<bool, CoreError> {
        self.board.swap_cells(from, to)
    }

    pub fn mark_cell(
        &mut self,
        row: usize,
        col: usize,
        validator: &str,
    ) -> Result<MarkReport, CoreError> {
        self.mark_cell_at(row, col, validator, chrono::Utc::now())
    }

    /// Mark a cell and collect any lines it completed.
    pub fn mark_cell_at(
        &mut self,
        row: usize,
        col: usize,
        validator: &str,
        at: Timestamp,
    ) -> Result<MarkReport, CoreError> {
        let outcome = self
            .board
            .mark_cell_at(row, col, validator, &self.rules, at)?;

        let new_lines = if outcome.is_success() {
            let found = detect_completed_lines(&self.board, &self.completed);
            self.completed.extend(found.iter().copied());
            found
        } else {
            tracing::debug!(session_id = %self.id, row, col, ?outcome, "Cell not marked");
            Vec::new()
        };

        let completion_percentage = self.board.completion_percentage();
        if !new_lines.is_empty() {
            tracing::info!(
                session_id = %self.id,
                new_lines = new_lines.len(),
                bingo_count = self.completed.len(),
                completion_percentage,
                "Bingo",
            );
        }

        Ok(MarkReport {
            outcome,
            new_lines,
            completion_percentage,
        })
    }

    /// Clear the board and the completed-lines set. The session id is kept.
    pub fn reset(&mut self) {
        self.board.reset();
        self.completed.clear();
        tracing::info!(session_id = %self.id, "Bingo board reset");
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            session_id: self.id,
            started_at: self.started_at,
            board: self.board.clone(),
            completed_lines: self.completed.clone(),
            completion_percentage: self.board.completion_percentage(),
        }
    }

    pub fn finish(&self) -> GameRecord {
        self.finish_at(chrono::Utc::now())
    }

    /// Summarise the session as a history entry ending at `ended_at`.
    pub fn finish_at(&self, ended_at: Timestamp) -> GameRecord {
        GameRecord {
            session_id: self.id,
            started_at: self.started_at,
            ended_at,
            board_size: self.board.size(),
            marked_cells: self.board.marked_count(),
            bingo_count: self.completed.len(),
            completed_lines: self.completed.iter().copied().collect(),
            completion_percentage: self.board.completion_percentage(),
        }
    }
}
