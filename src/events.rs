//! Run lifecycle events.
//!
//! The runner emits one [`Event::RunState`] per state transition via
//! [`EventBus::emit`]; anything interested (logging, a status line, tests)
//! subscribes via [`EventBus::subscribe`]. Built on [`tokio::sync::broadcast`]
//! so listeners never slow a run down.

use std::fmt;

use tokio::sync::broadcast;

/// Identifier of one submitted run, unique per [`JobRunner`](crate::runner::JobRunner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a run is in its lifecycle.
///
/// `Created → Validated → ArtifactWritten → EngineLaunched → EngineExited →
/// Cleaned → Reported`. Any state may jump straight to `Reported` with
/// `success: false`, but once `ArtifactWritten` is reached `Cleaned` always
/// comes before `Reported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Validated,
    ArtifactWritten,
    EngineLaunched,
    EngineExited,
    Cleaned,
    Reported { success: bool },
}

/// Events that flow through the system.
#[derive(Debug, Clone)]
pub enum Event {
    RunState { run: RunId, state: RunState },
}

/// A broadcast channel that any component can emit to or subscribe from.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    /// Returns the number of receivers that will see it.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub(crate) fn transition(&self, run: RunId, state: RunState) {
        tracing::trace!(%run, ?state, "run state");
        self.emit(Event::RunState { run, state });
    }

    /// Subscribe to future events (past ones are not replayed).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
