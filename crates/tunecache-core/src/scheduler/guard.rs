//! RAII guards for the worker: clear the running slot, report thread exit.

use std::sync::mpsc;

use super::state::Shared;

/// Clears the running slot (and drops its cancel token) when dropped,
/// including when the job's processing unwinds.
pub(super) struct RunningSlotGuard<'a> {
    pub(super) shared: &'a Shared,
}

impl Drop for RunningSlotGuard<'_> {
    fn drop(&mut self) {
        self.shared.lock().running = None;
    }
}

/// Tells a waiting `shutdown` that the worker thread is gone.
pub(super) struct ExitSignal(pub(super) mpsc::Sender<()>);

impl Drop for ExitSignal {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}
