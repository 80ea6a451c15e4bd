//! Tests for progress reporting and cancellation.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use slate_core::events::{ChannelReporter, NoopReporter, ProgressEvent, ProgressKind, ProgressReporter};
use slate_core::{Cancellable, CancellationToken};

#[test]
fn channel_reporter_is_non_blocking_across_threads() {
    let (reporter, rx) = ChannelReporter::bounded(4);
    let reporter = Arc::new(reporter);

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let reporter = Arc::clone(&reporter);
            thread::spawn(move || {
                for step in 0..100 {
                    reporter.try_emit(ProgressEvent::new(ProgressKind::SimulationProgress, step, 100, ""));
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }
    reporter.emit_final(ProgressEvent::finished(ProgressKind::SimulationComplete, 100, "done"));

    let received: Vec<_> = rx.try_iter().collect();
    assert!(received.len() <= 4);
    assert_eq!(received.last().unwrap().kind, ProgressKind::SimulationComplete);
    // every event is either delivered or counted as dropped
    assert_eq!(received.len() as u64 + reporter.dropped(), 401);
}

#[test]
fn final_event_survives_disconnected_consumer() {
    let (reporter, rx) = ChannelReporter::bounded(1);
    drop(rx);
    assert!(!reporter.try_emit(ProgressEvent::new(ProgressKind::LineupGenerated, 1, 2, "")));
    // must return rather than spin
    reporter.emit_final(ProgressEvent::finished(ProgressKind::OptimizationComplete, 2, ""));
}

#[test]
fn progress_fraction_is_clamped() {
    let e = ProgressEvent::new(ProgressKind::LineupGenerated, 7, 5, "over");
    assert_eq!(e.progress, 1.0);
    let e = ProgressEvent::new(ProgressKind::OptimizationStarted, 0, 0, "");
    assert_eq!(e.progress, 0.0);
    assert!(ProgressKind::OptimizationComplete.is_terminal());
    assert!(!ProgressKind::LineupGenerated.is_terminal());
}

#[test]
fn progress_event_serializes_kind_in_snake_case() {
    let e = ProgressEvent::finished(ProgressKind::SimulationComplete, 3, "ok");
    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["kind"], "simulation_complete");
    assert_eq!(json["step"], 3);
}

#[test]
fn noop_reporter_accepts_everything() {
    let r = NoopReporter;
    assert!(r.try_emit(ProgressEvent::new(ProgressKind::LineupGenerated, 1, 1, "")));
}

#[test]
fn cancellation_is_shared_between_clones() {
    let token = CancellationToken::new();
    let scoped = token.with_timeout(Duration::from_secs(60));
    assert!(!scoped.should_stop());
    token.cancel();
    assert!(scoped.is_cancelled());
    assert!(scoped.should_stop());
}

#[test]
fn earlier_deadline_wins() {
    let token = CancellationToken::new();
    let soon = Instant::now() + Duration::from_millis(10);
    let tight = token.with_deadline(soon);
    let loosened = tight.with_timeout(Duration::from_secs(3600));
    assert_eq!(loosened.deadline(), Some(soon));
    // caller's token is untouched
    assert_eq!(token.deadline(), None);

    thread::sleep(Duration::from_millis(20));
    assert!(loosened.is_expired());
    assert!(!loosened.is_cancelled());
}
