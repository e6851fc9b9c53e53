//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`BingoEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the host application.

use chrono::{DateTime, Utc};
use qcbingo_core::lines::CompletedLine;
use qcbingo_core::session::MarkReport;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A cell transitioned to marked.
pub const EVENT_CELL_MARKED: &str = "bingo.cell_marked";
/// A row, column or diagonal was completed.
pub const EVENT_LINE_COMPLETED: &str = "bingo.line_completed";
/// The completion percentage changed.
pub const EVENT_PROGRESS: &str = "bingo.progress";
/// The board was reset.
pub const EVENT_BOARD_RESET: &str = "bingo.board_reset";

// ---------------------------------------------------------------------------
// BingoEvent
// ---------------------------------------------------------------------------

/// Something that happened on a bingo board.
///
/// Constructed via [`BingoEvent::new`] and enriched with
/// [`with_actor`](BingoEvent::with_actor) and
/// [`with_payload`](BingoEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingoEvent {
    /// Dot-separated event name, e.g. `"bingo.line_completed"`.
    pub event_type: String,

    /// Session the event belongs to.
    pub session_id: Uuid,

    /// Validator or operator that triggered the event, when known.
    pub actor: Option<String>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl BingoEvent {
    pub fn new(event_type: impl Into<String>, session_id: Uuid) -> Self {
        Self {
            event_type: event_type.into(),
            session_id,
            actor: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn line_completed(session_id: Uuid, line: CompletedLine) -> Self {
        Self::new(EVENT_LINE_COMPLETED, session_id).with_payload(serde_json::json!({
            "line": line,
        }))
    }

    pub fn progress(session_id: Uuid, completion_percentage: u8) -> Self {
        Self::new(EVENT_PROGRESS, session_id).with_payload(serde_json::json!({
            "completion_percentage": completion_percentage,
        }))
    }

    pub fn board_reset(session_id: Uuid) -> Self {
        Self::new(EVENT_BOARD_RESET, session_id)
    }

    /// Events describing a mark trigger: the mark itself, each new line and
    /// the new progress. Unsuccessful marks produce nothing.
    pub fn from_mark_report(
        session_id: Uuid,
        row: usize,
        col: usize,
        validator: &str,
        report: &MarkReport,
    ) -> Vec<Self> {
        if !report.outcome.is_success() {
            return Vec::new();
        }
        let mut events = Vec::with_capacity(report.new_lines.len() + 2);
        events.push(
            Self::new(EVENT_CELL_MARKED, session_id)
                .with_actor(validator)
                .with_payload(serde_json::json!({ "row": row, "col": col })),
        );
        events.extend(
            report
                .new_lines
                .iter()
                .map(|line| Self::line_completed(session_id, *line).with_actor(validator)),
        );
        events.push(Self::progress(session_id, report.completion_percentage));
        events
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use qcbingo_events::bus::{BingoEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(BingoEvent::board_reset(uuid::Uuid::new_v4()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BingoEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no active subscribers the event is dropped.
    pub fn publish(&self, event: BingoEvent) {
        tracing::trace!(event_type = %event.event_type, "Publishing bingo event");
        // A send error only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = BingoEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BingoEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use qcbingo_core::board::MarkOutcome;

    use super::*;

    fn report(outcome: MarkOutcome, new_lines: Vec<CompletedLine>) -> MarkReport {
        MarkReport {
            outcome,
            new_lines,
            completion_percentage: 40,
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let session_id = Uuid::new_v4();

        bus.publish(BingoEvent::line_completed(session_id, CompletedLine::row(2)).with_actor("qc1"));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, EVENT_LINE_COMPLETED);
        assert_eq!(received.session_id, session_id);
        assert_eq!(received.actor.as_deref(), Some("qc1"));
        assert_eq!(received.payload["line"]["type"], "row");
        assert_eq!(received.payload["line"]["index"], 2);
    }

    #[tokio::test]
    async fn every_subscriber_sees_a_bingo_in_report_order() {
        let bus = EventBus::default();
        let mut board_view = bus.subscribe();
        let mut leaderboard = bus.subscribe();
        let session_id = Uuid::new_v4();

        bus.publish_all(BingoEvent::from_mark_report(
            session_id,
            0,
            4,
            "sup1",
            &report(MarkOutcome::Marked, vec![CompletedLine::row(0)]),
        ));

        for rx in [&mut board_view, &mut leaderboard] {
            let marked = rx.recv().await.expect("cell event");
            assert_eq!(marked.event_type, EVENT_CELL_MARKED);
            assert_eq!(marked.payload["col"], 4);
            let line = rx.recv().await.expect("line event");
            assert_eq!(line.payload["line"]["type"], "row");
            assert_eq!(line.actor.as_deref(), Some("sup1"));
            let progress = rx.recv().await.expect("progress event");
            assert_eq!(progress.payload["completion_percentage"], 40);
            assert_eq!(progress.session_id, session_id);
        }
    }

    #[tokio::test]
    async fn slow_subscriber_lags_but_keeps_latest_progress() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        let session_id = Uuid::new_v4();

        for pct in [20, 40, 60] {
            bus.publish(BingoEvent::progress(session_id, pct));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        let next = rx.recv().await.expect("buffered event");
        assert_eq!(next.payload["completion_percentage"], 40);
    }

    #[test]
    fn reset_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        bus.publish(BingoEvent::board_reset(Uuid::new_v4()));
        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn mark_report_expands_to_ordered_events() {
        let session_id = Uuid::new_v4();
        let events = BingoEvent::from_mark_report(
            session_id,
            2,
            2,
            "qc1",
            &report(
                MarkOutcome::Marked,
                vec![CompletedLine::main_diagonal(), CompletedLine::anti_diagonal()],
            ),
        );

        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                EVENT_CELL_MARKED,
                EVENT_LINE_COMPLETED,
                EVENT_LINE_COMPLETED,
                EVENT_PROGRESS
            ]
        );
        assert_eq!(events[1].payload["line"]["index"], 1);
        assert_eq!(events[2].payload["line"]["index"], 2);
        assert_eq!(events[3].payload["completion_percentage"], 40);
    }

    #[test]
    fn failed_mark_produces_no_events() {
        let events = BingoEvent::from_mark_report(
            Uuid::new_v4(),
            0,
            0,
            "qc1",
            &report(MarkOutcome::InvalidPair, vec![]),
        );
        assert!(events.is_empty());
    }
}
