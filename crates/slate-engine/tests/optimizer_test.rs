//! Lineup optimization through the engine facade.

use std::sync::Arc;

use slate_core::events::NoopReporter;
use slate_core::{
    CancellationToken, Cancellable, Constraints, NoCache, OptimizeError, OptimizeOutcome,
    PerformanceMode, Platform, Player, PlayerId, RosterSlot, SlateConfig, SlateErrorCode,
    StackRule, Strategy, ValidationError,
};
use slate_engine::{OptimizeRequest, SlateEngine};

fn engine() -> SlateEngine {
    SlateEngine::new(SlateConfig::default(), Arc::new(NoCache), Arc::new(NoopReporter)).unwrap()
}

/// Eight guards; the six most projected cost more than the cap.
fn eight_guards() -> Vec<Player> {
    let salaries = [12_000, 11_000, 9_500, 8_000, 7_000, 6_000, 5_500, 4_000];
    let projections = [31.0, 29.5, 26.0, 24.0, 21.5, 18.0, 16.5, 11.0];
    salaries
        .iter()
        .zip(projections)
        .enumerate()
        .map(|(i, (&salary, projection))| {
            Player::new(i as u32 + 1, &["G"], Platform::DraftKings, salary, projection)
        })
        .collect()
}

fn six_guards(cap: i64) -> Constraints {
    Constraints::new(Platform::DraftKings, cap, vec![RosterSlot::new("G", 6)])
}

/// Best projection total over every 6-of-n subset under the cap.
fn brute_force_best(pool: &[Player], cap: i64) -> Option<f64> {
    let n = pool.len();
    let mut best: Option<f64> = None;
    for mask in 0u32..(1 << n) {
        if mask.count_ones() != 6 {
            continue;
        }
        let members = (0..n).filter(|i| mask & (1 << i) != 0);
        let (salary, projection) = members.fold((0i64, 0.0), |(s, p), i| {
            (s + pool[i].salary_on(Platform::DraftKings).unwrap(), p + pool[i].projection)
        });
        if salary <= cap {
            best = Some(best.map_or(projection, |b: f64| b.max(projection)));
        }
    }
    best
}

fn optimized(outcome: OptimizeOutcome) -> slate_core::OptimizationResult {
    match outcome {
        OptimizeOutcome::Optimized(result) => result,
        other => panic!("expected lineups, got {other:?}"),
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────

#[test]
fn eight_player_slate_yields_one_optimal_lineup() {
    let pool = eight_guards();
    let req = OptimizeRequest::new(pool.clone(), six_guards(50_000), Strategy::Balanced, 1);
    let result = optimized(engine().optimize(&req, &CancellationToken::new()).unwrap());

    assert_eq!(result.lineups.len(), 1);
    let lineup = &result.lineups[0];
    let mut ids = lineup.sorted_ids();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    assert!(lineup.total_salary <= 50_000);
    assert!(lineup.slots.iter().all(|s| s.slot == "G"));

    let best = brute_force_best(&pool, 50_000).unwrap();
    assert!((lineup.total_projection - best).abs() < 1e-9);
    assert!(!result.metadata.partial);
    assert!(!result.metadata.cache_hit);
    assert_eq!(result.metadata.strategy, Strategy::Balanced);
}

#[test]
fn cap_below_cheapest_roster_is_infeasible() {
    let pool = eight_guards();
    assert_eq!(brute_force_best(&pool, 30_000), None);
    let req = OptimizeRequest::new(pool, six_guards(30_000), Strategy::Balanced, 3);
    let outcome = engine().optimize(&req, &CancellationToken::new()).unwrap();
    assert!(outcome.is_infeasible());
    assert!(outcome.lineups().is_empty());
}

#[test]
fn cheap_players_beyond_the_candidate_cap_still_fill_the_roster() {
    // Twenty stars crowd the cheap players out of the per-slot candidate
    // cap, yet six stars cost more than the cap allows.
    let mut pool: Vec<Player> = (1..=20)
        .map(|i| Player::new(i, &["G"], Platform::DraftKings, 10_000, 40.0 + i as f64))
        .collect();
    pool.extend((21..=25).map(|i| Player::new(i, &["G"], Platform::DraftKings, 5_000, 10.0 + (i - 20) as f64)));

    let req = OptimizeRequest::new(pool, six_guards(50_000), Strategy::Balanced, 1)
        .with_mode(PerformanceMode::Balanced);
    let result = optimized(engine().optimize(&req, &CancellationToken::new()).unwrap());

    let lineup = &result.lineups[0];
    assert_eq!(lineup.total_salary, 50_000);
    let ids: Vec<u32> = lineup.sorted_ids().iter().map(|id| id.0).collect();
    assert_eq!(ids, vec![17, 18, 19, 20, 24, 25]);
    assert!(!result.metadata.partial);
}

#[test]
fn locked_and_excluded_players_are_honored_in_every_lineup() {
    let constraints = six_guards(60_000).lock(8).exclude(1);
    let req = OptimizeRequest::new(eight_guards(), constraints, Strategy::Ceiling, 3);
    let result = optimized(engine().optimize(&req, &CancellationToken::new()).unwrap());
    assert!(!result.lineups.is_empty());
    for lineup in &result.lineups {
        assert!(lineup.contains(PlayerId(8)));
        assert!(!lineup.contains(PlayerId(1)));
        assert!(lineup.total_salary <= 60_000);
    }
}

#[test]
fn multi_position_roster_fills_every_slot() {
    let pool = vec![
        Player::new(1, &["PG"], Platform::FanDuel, 3_000, 20.0),
        Player::new(2, &["PG", "SG"], Platform::FanDuel, 4_000, 30.0),
        Player::new(3, &["SG"], Platform::FanDuel, 2_500, 12.0),
        Player::new(4, &["C"], Platform::FanDuel, 3_500, 22.0),
        Player::new(5, &["C"], Platform::FanDuel, 2_000, 9.0),
    ];
    let constraints = Constraints::new(
        Platform::FanDuel,
        10_000,
        vec![RosterSlot::new("PG", 1), RosterSlot::new("SG", 1), RosterSlot::new("C", 1)],
    );
    let req = OptimizeRequest::new(pool, constraints, Strategy::Value, 1)
        .with_mode(PerformanceMode::Quality);
    let result = optimized(engine().optimize(&req, &CancellationToken::new()).unwrap());
    let lineup = &result.lineups[0];
    let labels: Vec<&str> = lineup.slots.iter().map(|s| s.slot.as_str()).collect();
    assert_eq!(labels, vec!["PG", "SG", "C"]);
    assert!(lineup.total_salary <= 10_000);
    assert_eq!(result.metadata.mode, PerformanceMode::Quality);
}

#[test]
fn team_max_spreads_lineup_across_teams() {
    let pool: Vec<Player> = (1..=6)
        .map(|i| {
            let team = if i <= 3 { "AAA" } else { "BBB" };
            Player::new(i, &["G"], Platform::DraftKings, 1_000, 40.0 - i as f64).with_team(team, "AAA@BBB")
        })
        .collect();
    let constraints = Constraints::new(Platform::DraftKings, 10_000, vec![RosterSlot::new("G", 2)])
        .with_stack(StackRule::team(None, Some(1)));
    let req = OptimizeRequest::new(pool.clone(), constraints, Strategy::Balanced, 1);
    let result = optimized(engine().optimize(&req, &CancellationToken::new()).unwrap());
    let teams: Vec<&str> = result.lineups[0]
        .player_ids()
        .map(|id| pool.iter().find(|p| p.id == id).unwrap().team.as_str())
        .collect();
    assert_ne!(teams[0], teams[1]);
}

// ── Validation ──────────────────────────────────────────────────────────

#[test]
fn malformed_requests_are_rejected_verbatim() {
    let engine = engine();
    let token = CancellationToken::new();

    let empty = OptimizeRequest::new(Vec::new(), six_guards(50_000), Strategy::Balanced, 1);
    assert!(matches!(
        engine.optimize(&empty, &token),
        Err(OptimizeError::Validation(ValidationError::EmptyPool))
    ));

    let no_cap = OptimizeRequest::new(eight_guards(), six_guards(0), Strategy::Balanced, 1);
    assert!(matches!(
        engine.optimize(&no_cap, &token),
        Err(OptimizeError::Validation(ValidationError::NonPositiveCap(0)))
    ));

    let clash = OptimizeRequest::new(eight_guards(), six_guards(50_000).lock(2).exclude(2), Strategy::Balanced, 1);
    let err = engine.optimize(&clash, &token).unwrap_err();
    assert!(matches!(
        err,
        OptimizeError::Validation(ValidationError::LockedAndExcluded(PlayerId(2)))
    ));
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let bad_exposure = OptimizeRequest::new(
        eight_guards(),
        six_guards(50_000).with_exposure(3, 0.8, 0.2),
        Strategy::Balanced,
        2,
    );
    assert!(matches!(
        engine.optimize(&bad_exposure, &token),
        Err(OptimizeError::Validation(ValidationError::InvalidExposure { .. }))
    ));

    let zero_count = Constraints::new(Platform::DraftKings, 50_000, vec![RosterSlot::new("G", 0)]);
    let req = OptimizeRequest::new(eight_guards(), zero_count, Strategy::Balanced, 1);
    assert!(matches!(
        engine.optimize(&req, &token),
        Err(OptimizeError::Validation(ValidationError::EmptySlot(_)))
    ));
}

// ── Cancellation ────────────────────────────────────────────────────────

#[test]
fn cancelled_request_times_out_instead_of_returning_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let req = OptimizeRequest::new(eight_guards(), six_guards(50_000), Strategy::Balanced, 5);
    match engine().optimize(&req, &token).unwrap() {
        OptimizeOutcome::Timeout(meta) => assert!(meta.partial),
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[test]
fn elapsed_deadline_times_out() {
    let req = OptimizeRequest::new(eight_guards(), six_guards(50_000), Strategy::Balanced, 2)
        .with_timeout(std::time::Duration::ZERO);
    let outcome = engine().optimize(&req, &CancellationToken::new()).unwrap();
    assert!(matches!(outcome, OptimizeOutcome::Timeout(_)));
}
