use tokio::sync::mpsc;

use super::{ActiveRuns, Completion};
use crate::events::RunId;

/// Receiving end of a [`JobRunner`](super::JobRunner), owned by the
/// interactive context. Callbacks run here, never on a background task.
pub struct CompletionQueue {
    rx: mpsc::UnboundedReceiver<Completion>,
    active: ActiveRuns,
}

impl CompletionQueue {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Completion>, active: ActiveRuns) -> Self {
        Self { rx, active }
    }

    /// Wait for the next finished run and invoke its callback.
    /// Returns `None` once the runner and all its runs are gone.
    pub async fn dispatch_next(&mut self) -> Option<RunId> {
        let completion = self.rx.recv().await?;
        Some(self.deliver(completion))
    }

    /// Deliver every run that has already finished, without waiting.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.deliver(completion);
            delivered += 1;
        }
        delivered
    }

    fn deliver(&self, completion: Completion) -> RunId {
        let Completion {
            run,
            outcome,
            callback,
        } = completion;
        self.active.lock().unwrap().remove(&run);
        callback(outcome);
        run
    }
}
