//! End-to-end board scenarios driven through [`GameSession`].

use std::collections::BTreeSet;

use qcbingo_core::board::{Board, MarkOutcome};
use qcbingo_core::catalog::{DefectType, GarmentPart};
use qcbingo_core::compatibility::CompatibilityRules;
use qcbingo_core::lines::{detect_completed_lines, CompletedLine};
use qcbingo_core::session::GameSession;

fn label() -> GarmentPart {
    GarmentPart::new("A", "Label")
}

fn print() -> DefectType {
    DefectType::new(1, "Print")
}

fn place(session: &mut GameSession, row: usize, col: usize) {
    session.place_garment_part(row, col, label()).unwrap();
    session.place_defect_type(row, col, print()).unwrap();
}

// ---------------------------------------------------------------------------
// Scenario: first row on a permissive 3x3 board
// ---------------------------------------------------------------------------

#[test]
fn first_row_bingo_on_three_by_three() {
    let mut session = GameSession::new(3, CompatibilityRules::permissive()).unwrap();
    for col in 0..3 {
        place(&mut session, 0, col);
    }

    let mut new_lines = Vec::new();
    for col in 0..3 {
        let report = session.mark_cell(0, col, "qc1").unwrap();
        assert_eq!(report.outcome, MarkOutcome::Marked);
        new_lines.extend(report.new_lines);
    }

    assert_eq!(new_lines, vec![CompletedLine::row(0)]);
    assert_eq!(session.completion_percentage(), 33);
    assert_eq!(
        detect_completed_lines(session.board(), &BTreeSet::new()),
        vec![CompletedLine::row(0)]
    );
}

// ---------------------------------------------------------------------------
// Scenario: incompatible pair is refused at mark time
// ---------------------------------------------------------------------------

#[test]
fn incompatible_pair_cannot_be_marked() {
    let mut rules = CompatibilityRules::permissive();
    rules.set_rule("B", [4, 7, 8, 13]).unwrap();
    let mut session = GameSession::new(3, rules).unwrap();

    session
        .place_garment_part(1, 1, GarmentPart::new("B", "Sleeve"))
        .unwrap();
    session
        .place_defect_type(1, 1, DefectType::new(99, "Unknown"))
        .unwrap();
    let before = session.snapshot();

    let report = session.mark_cell(1, 1, "qc1").unwrap();

    assert!(!report.outcome.is_success());
    assert_eq!(report.outcome, MarkOutcome::InvalidPair);
    assert!(report.new_lines.is_empty());
    assert_eq!(session.snapshot(), before);
}

// ---------------------------------------------------------------------------
// Scenario: the centre cell of a 5x5 completes both diagonals together
// ---------------------------------------------------------------------------

#[test]
fn centre_completes_both_diagonals_in_one_batch() {
    let mut session = GameSession::new(5, CompatibilityRules::permissive()).unwrap();
    for i in 0..5 {
        place(&mut session, i, i);
        place(&mut session, i, 4 - i);
    }

    for i in 0..5 {
        if i == 2 {
            continue;
        }
        assert!(session.mark_cell(i, i, "qc1").unwrap().new_lines.is_empty());
        assert!(session.mark_cell(i, 4 - i, "qc1").unwrap().new_lines.is_empty());
    }

    let report = session.mark_cell(2, 2, "qc1").unwrap();
    assert_eq!(
        report.new_lines,
        vec![CompletedLine::main_diagonal(), CompletedLine::anti_diagonal()]
    );
    assert_eq!(report.completion_percentage, 36);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn remarking_does_not_touch_lines_or_metadata() {
    let mut session = GameSession::new(2, CompatibilityRules::permissive()).unwrap();
    place(&mut session, 0, 0);
    place(&mut session, 0, 1);
    session.mark_cell(0, 0, "qc1").unwrap();
    session.mark_cell(0, 1, "qc1").unwrap();
    let before = session.snapshot();

    let report = session.mark_cell(0, 0, "qc9").unwrap();

    assert_eq!(report.outcome, MarkOutcome::AlreadyMarked);
    assert!(report.new_lines.is_empty());
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.board().cell(0, 0).unwrap().validated_by(), Some("qc1"));
}

#[test]
fn completion_stays_in_bounds_for_every_step() {
    for size in 1..=6 {
        let mut session = GameSession::new(size, CompatibilityRules::permissive()).unwrap();
        for row in 0..size {
            for col in 0..size {
                place(&mut session, row, col);
                let pct = session.mark_cell(row, col, "qc1").unwrap().completion_percentage;
                assert!(pct <= 100);
                assert_eq!(pct == 100, session.board().is_full());
            }
        }
        assert_eq!(session.completion_percentage(), 100);
        assert_eq!(session.bingo_count(), 2 * size + 2);
    }
}

#[test]
fn reset_is_pure_regardless_of_history() {
    let mut session = GameSession::new(4, CompatibilityRules::permissive()).unwrap();
    for col in 0..4 {
        place(&mut session, 3, col);
        session.mark_cell(3, col, "qc1").unwrap();
    }
    place(&mut session, 0, 0);

    session.reset();

    assert_eq!(session.completion_percentage(), 0);
    assert!(session.completed_lines().is_empty());
    assert_eq!(session.board(), &Board::new(4).unwrap());
}

#[test]
fn lenient_placement_strict_marking() {
    let mut session = GameSession::new(3, CompatibilityRules::builtin()).unwrap();
    // Sleeve with a print defect is not realistic but placement accepts it.
    session
        .place_garment_part(0, 0, GarmentPart::new("B", "Sleeve"))
        .unwrap();
    session.place_defect_type(0, 0, print()).unwrap();
    assert_eq!(
        session.board().cell(0, 0).unwrap().defect_type().unwrap().code,
        1
    );
    assert_eq!(
        session.mark_cell(0, 0, "qc1").unwrap().outcome,
        MarkOutcome::InvalidPair
    );

    // Correcting the mis-drop makes the cell markable.
    session
        .place_defect_type(0, 0, DefectType::new(13, "Raw Edge"))
        .unwrap();
    assert_eq!(
        session.mark_cell(0, 0, "qc1").unwrap().outcome,
        MarkOutcome::Marked
    );
}
