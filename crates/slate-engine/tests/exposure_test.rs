//! Exposure balancing across lineup sets.

use std::sync::Arc;

use slate_core::events::NoopReporter;
use slate_core::{
    CancellationToken, Constraints, NoCache, OptimizationResult, OptimizeOutcome, Platform, Player,
    PlayerId, RosterSlot, SlateConfig, Strategy,
};
use slate_engine::{OptimizeRequest, SlateEngine};

fn engine() -> SlateEngine {
    SlateEngine::new(SlateConfig::default(), Arc::new(NoCache), Arc::new(NoopReporter)).unwrap()
}

fn build(pool: Vec<Player>, constraints: Constraints, k: usize) -> OptimizationResult {
    let req = OptimizeRequest::new(pool, constraints, Strategy::Balanced, k);
    match engine().optimize(&req, &CancellationToken::new()).unwrap() {
        OptimizeOutcome::Optimized(result) => result,
        other => panic!("expected lineups, got {other:?}"),
    }
}

fn guards(n: u32) -> Vec<Player> {
    (1..=n)
        .map(|i| Player::new(i, &["G"], Platform::DraftKings, 1_000, 40.0 - i as f64))
        .collect()
}

#[test]
fn locked_player_reaches_full_exposure_and_underused_player_is_flagged() {
    let pool = vec![
        Player::new(1, &["G"], Platform::DraftKings, 5_000, 20.0),
        Player::new(2, &["G"], Platform::DraftKings, 5_000, 20.0),
    ];
    let constraints = Constraints::new(Platform::DraftKings, 5_000, vec![RosterSlot::new("G", 1)])
        .lock(1)
        .with_exposure(2, 0.5, 1.0);
    let result = build(pool, constraints, 10);

    assert_eq!(result.lineups.len(), 10);
    assert!(result.lineups.iter().all(|l| l.contains(PlayerId(1))));
    let report = &result.exposure;
    assert_eq!(report.exposure_of(PlayerId(1)), 1.0);
    let flagged = report.violation_for(PlayerId(2)).expect("player 2 is under-used");
    assert_eq!(flagged.realized, 0.0);
    assert!((flagged.shortfall - 0.5).abs() < 1e-9);
    assert_eq!(flagged.excess, 0.0);
    assert!(report.violation_for(PlayerId(1)).is_none());
    assert!(!report.relaxations.is_empty());
    assert!(!report.is_clean());
}

#[test]
fn max_exposure_holds_across_the_set() {
    let constraints = Constraints::new(Platform::DraftKings, 10_000, vec![RosterSlot::new("G", 2)])
        .with_exposure(1, 0.0, 0.5)
        .with_exposure(2, 0.0, 0.34);
    let result = build(guards(6), constraints, 6);
    let report = &result.exposure;

    assert_eq!(report.generated, 6);
    assert!(report.exposure_of(PlayerId(1)) <= 0.5 + 1e-9);
    assert!(report.exposure_of(PlayerId(2)) <= 0.34);
    assert!(report.violations.is_empty());
    assert!(report.exposure_overrides.is_empty());
}

#[test]
fn min_exposure_pulls_in_a_weak_player() {
    let constraints = Constraints::new(Platform::DraftKings, 10_000, vec![RosterSlot::new("G", 2)])
        .with_exposure(6, 0.6, 1.0);
    let result = build(guards(6), constraints, 5);
    let count = result.lineups.iter().filter(|l| l.contains(PlayerId(6))).count();
    assert!(count >= 3);
    assert!(result.exposure.violation_for(PlayerId(6)).is_none());
}

#[test]
fn lineups_stay_diverse_unless_a_relaxation_is_recorded() {
    let constraints = Constraints::new(Platform::DraftKings, 10_000, vec![RosterSlot::new("G", 3)])
        .with_min_unique(2);
    let result = build(guards(8), constraints, 5);
    let report = &result.exposure;
    assert_eq!(result.lineups.len(), 5);

    let first_relaxed = report
        .relaxations
        .first()
        .map_or(usize::MAX, |r| r.lineup_index);
    for (i, a) in result.lineups.iter().enumerate().take(first_relaxed) {
        for b in &result.lineups[..i] {
            assert!(a.shared_with(b) <= 1, "lineups share more than R - min_unique players");
        }
    }
}

#[test]
fn report_lists_every_configured_player() {
    let constraints = Constraints::new(Platform::DraftKings, 10_000, vec![RosterSlot::new("G", 2)])
        .with_exposure(5, 0.0, 1.0);
    let result = build(guards(5), constraints, 2);
    let ids: Vec<PlayerId> = result.exposure.exposures.iter().map(|e| e.player).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert!(ids.contains(&PlayerId(5)));
    assert_eq!(result.exposure.requested, 2);
}
