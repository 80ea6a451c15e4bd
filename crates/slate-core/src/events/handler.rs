//! ProgressReporter trait.

use super::types::ProgressEvent;

/// Receiver of progress events.
///
/// `try_emit` must never block the producer; it returns `false` when the
/// event was dropped. `emit_final` must deliver the event.
pub trait ProgressReporter: Send + Sync {
    fn try_emit(&self, event: ProgressEvent) -> bool;

    fn emit_final(&self, event: ProgressEvent);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn try_emit(&self, _event: ProgressEvent) -> bool {
        true
    }

    fn emit_final(&self, _event: ProgressEvent) {}
}
