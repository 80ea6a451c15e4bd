//! Bounded-channel progress reporter.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::handler::ProgressReporter;
use super::types::ProgressEvent;

/// Reporter backed by a bounded crossbeam channel.
///
/// Intermediate events are dropped when the channel is full. The final
/// event evicts the oldest queued event instead, so a slow consumer always
/// sees completion.
pub struct ChannelReporter {
    tx: Sender<ProgressEvent>,
    /// Receiver handle used only to evict stale events for the final one.
    evict: Receiver<ProgressEvent>,
    dropped: AtomicU64,
}

impl ChannelReporter {
    /// Create a reporter and the consumer end of its channel.
    pub fn bounded(capacity: usize) -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = bounded(capacity.max(1));
        let reporter = Self {
            tx,
            evict: rx.clone(),
            dropped: AtomicU64::new(0),
        };
        (reporter, rx)
    }

    /// Number of events dropped or evicted so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ProgressReporter for ChannelReporter {
    fn try_emit(&self, event: ProgressEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    fn emit_final(&self, event: ProgressEvent) {
        let mut pending = event;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    if self.evict.try_recv().is_ok() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    pending = back;
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!("progress consumer gone; final event discarded");
                    return;
                }
            }
        }
    }
}
