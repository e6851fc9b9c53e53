//! Replays a [`Script`] against a fresh [`GameSession`].

use anyhow::Context;
use qcbingo_core::board::PlacementOutcome;
use qcbingo_core::catalog::Catalog;
use qcbingo_core::session::{BoardSnapshot, GameRecord, GameSession, MarkReport};
use qcbingo_events::{BingoEvent, EventBus};
use serde::Serialize;

use crate::config::CliConfig;
use crate::script::{Script, ScriptAction};

/// Result of a single script action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
    Placed { outcome: PlacementOutcome },
    Marked { report: MarkReport },
    Swapped { applied: bool },
    Cleared { applied: bool },
    Reset,
}

/// Everything a replay produced, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub steps: Vec<StepOutcome>,
    pub snapshot: BoardSnapshot,
    pub record: GameRecord,
}

/// Replay `script` on a new session built from `config`, publishing events on `bus`.
pub fn run_script(config: &CliConfig, script: Script, bus: &EventBus) -> anyhow::Result<RunOutput> {
    let mut catalog = Catalog::builtin();
    for part in script.custom_garment_parts {
        catalog
            .add_custom_garment_part(part)
            .context("Invalid custom garment part")?;
    }
    for defect in script.custom_defect_types {
        catalog
            .add_custom_defect_type(defect)
            .context("Invalid custom defect type")?;
    }

    let mut session = GameSession::new(config.board_size, config.rules.rules())?;
    let session_id = session.id();
    let mut steps = Vec::with_capacity(script.actions.len());

    for (index, action) in script.actions.into_iter().enumerate() {
        let step = apply(&mut session, &catalog, config, bus, action)
            .with_context(|| format!("Script action #{index} failed"))?;
        steps.push(step);
    }

    let record = session.finish();
    tracing::info!(
        %session_id,
        bingo_count = record.bingo_count,
        completion_percentage = record.completion_percentage,
        "Script replay finished",
    );

    Ok(RunOutput {
        steps,
        snapshot: session.snapshot(),
        record,
    })
}

fn apply(
    session: &mut GameSession,
    catalog: &Catalog,
    config: &CliConfig,
    bus: &EventBus,
    action: ScriptAction,
) -> anyhow::Result<StepOutcome> {
    let step = match action {
        ScriptAction::PlacePart { row, col, code } => {
            let part = catalog.require_garment_part(&code)?.clone();
            StepOutcome::Placed {
                outcome: session.place_garment_part(row, col, part)?,
            }
        }
        ScriptAction::PlaceDefect { row, col, code } => {
            let defect = catalog.require_defect_type(code)?.clone();
            StepOutcome::Placed {
                outcome: session.place_defect_type(row, col, defect)?,
            }
        }
        ScriptAction::Mark {
            row,
            col,
            validator,
        } => {
            let validator = validator.unwrap_or_else(|| config.validator_id.clone());
            let report = session.mark_cell(row, col, &validator)?;
            bus.publish_all(BingoEvent::from_mark_report(
                session.id(),
                row,
                col,
                &validator,
                &report,
            ));
            StepOutcome::Marked { report }
        }
        ScriptAction::Swap { from, to } => StepOutcome::Swapped {
            applied: session.swap_cells(from, to)?,
        },
        ScriptAction::Clear { row, col } => StepOutcome::Cleared {
            applied: session.clear_cell(row, col)?,
        },
        ScriptAction::Reset => {
            session.reset();
            bus.publish(BingoEvent::board_reset(session.id()));
            bus.publish(BingoEvent::progress(
                session.id(),
                session.completion_percentage(),
            ));
            StepOutcome::Reset
        }
    };
    Ok(step)
}
