//! Property tests for lineup and simulation invariants.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use slate_core::events::NoopReporter;
use slate_core::{
    CancellationToken, Constraints, ContestConfig, NoCache, OptimizeOutcome, Platform, Player,
    PlayerId, RosterSlot, SlateConfig,
};
use slate_core::Strategy as Scoring;
use slate_engine::optimizer::Scorer;
use slate_engine::simulation::percentile;
use slate_engine::{OptimizeRequest, SimulationRequest, SlateEngine};

const ROSTER: usize = 3;

fn engine() -> SlateEngine {
    let mut config = SlateConfig::default();
    config.simulation.workers = Some(1);
    SlateEngine::new(config, Arc::new(NoCache), Arc::new(NoopReporter)).unwrap()
}

fn arb_pool() -> impl Strategy<Value = Vec<Player>> {
    prop::collection::vec((10i64..50, 5u32..400), 5..10).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (salary, tenths))| {
                let projection = f64::from(tenths) / 10.0;
                Player::new(i as u32 + 1, &["G"], Platform::DraftKings, salary * 100, projection)
                    .with_range(projection * 0.5, projection * 1.5)
            })
            .collect()
    })
}

/// Best projection total over every feasible roster, by enumeration.
fn brute_force_best(pool: &[Player], constraints: &Constraints) -> Option<f64> {
    let n = pool.len();
    let mut best: Option<f64> = None;
    for mask in 0u32..(1 << n) {
        if mask.count_ones() as usize != ROSTER {
            continue;
        }
        let picked: Vec<&Player> = (0..n).filter(|i| mask & (1 << i) != 0).map(|i| &pool[i]).collect();
        if constraints.locked.iter().any(|id| !picked.iter().any(|p| p.id == *id))
            || picked.iter().any(|p| constraints.excluded.contains(&p.id))
        {
            continue;
        }
        let salary: i64 = picked.iter().filter_map(|p| p.salary_on(Platform::DraftKings)).sum();
        if salary > constraints.salary_cap {
            continue;
        }
        let projection: f64 = picked.iter().map(|p| p.projection).sum();
        best = Some(best.map_or(projection, |b: f64| b.max(projection)));
    }
    best
}

/// Pool with team and game keys so the correlation strategy has pairs.
fn arb_correlated_pool() -> impl Strategy<Value = Vec<Player>> {
    prop::collection::vec((10i64..50, 5u32..400, 0u8..4), 5..10).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (salary, tenths, team))| {
                let projection = f64::from(tenths) / 10.0;
                Player::new(i as u32 + 1, &["G"], Platform::DraftKings, salary * 100, projection)
                    .with_range(projection * 0.5, projection * 1.5)
                    .with_team(format!("T{team}"), format!("G{}", team / 2))
            })
            .collect()
    })
}

/// Best correlation-strategy lineup score over every roster under the cap.
fn brute_force_correlation(engine: &SlateEngine, pool: &[Player], cap: i64) -> Option<f64> {
    let analytics = engine.analyze(pool, Platform::DraftKings);
    let matrix = engine.correlation_matrix(pool);
    let scorer = Scorer::new(Scoring::Correlation, engine.config().scoring.weights(), pool, &matrix);
    let n = pool.len();
    let mut best: Option<f64> = None;
    for mask in 0u32..(1 << n) {
        if mask.count_ones() as usize != ROSTER {
            continue;
        }
        let picked: Vec<&Player> = (0..n).filter(|i| mask & (1 << i) != 0).map(|i| &pool[i]).collect();
        let salaries: Vec<i64> = picked.iter().filter_map(|p| p.salary_on(Platform::DraftKings)).collect();
        if salaries.iter().sum::<i64>() > cap {
            continue;
        }
        let score = scorer.lineup_score(&picked, &analytics, &salaries);
        best = Some(best.map_or(score, |b: f64| b.max(score)));
    }
    best
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn lineups_respect_roster_cap_locks_and_exclusions(
        pool in arb_pool(),
        cap in 3_000i64..15_000,
        k in 1usize..4,
        lock in prop::option::of(0usize..5),
        exclude in prop::option::of(0usize..5),
    ) {
        let mut constraints = Constraints::new(Platform::DraftKings, cap, vec![RosterSlot::new("G", ROSTER as u8)]);
        if let Some(i) = lock {
            constraints = constraints.lock(pool[i].id.raw());
        }
        if let Some(i) = exclude {
            if lock != Some(i) {
                constraints = constraints.exclude(pool[i].id.raw());
            }
        }
        let expected = brute_force_best(&pool, &constraints);
        let req = OptimizeRequest::new(pool.clone(), constraints.clone(), Scoring::Balanced, k);
        let outcome = engine().optimize(&req, &CancellationToken::new()).unwrap();

        match (&outcome, expected) {
            (OptimizeOutcome::Optimized(result), Some(best)) => {
                prop_assert!(!result.lineups.is_empty());
                prop_assert!(result.lineups.len() <= k);
                prop_assert!((result.lineups[0].total_projection - best).abs() < 1e-6);
                for lineup in &result.lineups {
                    let ids: BTreeSet<PlayerId> = lineup.player_ids().collect();
                    prop_assert_eq!(ids.len(), ROSTER);
                    prop_assert!(lineup.total_salary <= cap);
                    let salary: i64 = pool
                        .iter()
                        .filter(|p| ids.contains(&p.id))
                        .filter_map(|p| p.salary_on(Platform::DraftKings))
                        .sum();
                    prop_assert_eq!(salary, lineup.total_salary);
                    for id in &constraints.locked {
                        prop_assert!(ids.contains(id));
                    }
                    for id in &constraints.excluded {
                        prop_assert!(!ids.contains(id));
                    }
                }
            }
            (OptimizeOutcome::Infeasible(_), None) => {}
            (other, expected) => {
                prop_assert!(false, "outcome {:?} disagrees with enumeration {:?}", other, expected);
            }
        }
    }

    #[test]
    fn correlation_lineup_matches_enumeration(pool in arb_correlated_pool(), cap in 3_000i64..15_000) {
        let engine = engine();
        let expected = brute_force_correlation(&engine, &pool, cap);
        let constraints = Constraints::new(Platform::DraftKings, cap, vec![RosterSlot::new("G", ROSTER as u8)]);
        let req = OptimizeRequest::new(pool.clone(), constraints, Scoring::Correlation, 1);
        let outcome = engine.optimize(&req, &CancellationToken::new()).unwrap();

        match (&outcome, expected) {
            (OptimizeOutcome::Optimized(result), Some(best)) => {
                prop_assert!((result.lineups[0].score - best).abs() < 1e-6,
                    "search scored {} but enumeration found {}", result.lineups[0].score, best);
            }
            (OptimizeOutcome::Infeasible(_), None) => {}
            (other, expected) => {
                prop_assert!(false, "outcome {:?} disagrees with enumeration {:?}", other, expected);
            }
        }
    }

    #[test]
    fn exposure_stays_within_bounds_or_is_reported(
        pool in arb_pool(),
        k in 2usize..6,
        max in 0.2f64..1.0,
    ) {
        let constraints = Constraints::new(Platform::DraftKings, 1_000_000, vec![RosterSlot::new("G", ROSTER as u8)])
            .with_exposure(pool[0].id.raw(), 0.0, max);
        let req = OptimizeRequest::new(pool.clone(), constraints, Scoring::Balanced, k);
        let outcome = engine().optimize(&req, &CancellationToken::new()).unwrap();
        let OptimizeOutcome::Optimized(result) = outcome else {
            return Err(TestCaseError::fail("an uncapped pool of five or more players is feasible"));
        };
        let report = &result.exposure;
        let realized = report.exposure_of(pool[0].id);
        let flagged = report.violation_for(pool[0].id).is_some();
        prop_assert!(flagged || realized <= max + 1.0 / k as f64);
        if report.relaxations.is_empty() {
            for (i, a) in result.lineups.iter().enumerate() {
                for b in &result.lineups[..i] {
                    prop_assert!(a.shared_with(b) < ROSTER);
                }
            }
        }
    }

    #[test]
    fn percentiles_are_monotone(mut values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
        values.sort_by(f64::total_cmp);
        let qs = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 0.95, 0.99, 1.0];
        let ps: Vec<f64> = qs.iter().map(|&q| percentile(&values, q)).collect();
        prop_assert!(ps.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(ps[0], values[0]);
        prop_assert_eq!(ps[ps.len() - 1], values[values.len() - 1]);
    }

    #[test]
    fn simulated_rates_are_probabilities(pool in arb_pool(), seed in any::<u64>()) {
        let constraints = Constraints::new(Platform::DraftKings, 1_000_000, vec![RosterSlot::new("G", ROSTER as u8)]);
        let engine = engine();
        let token = CancellationToken::new();
        let lineups = engine
            .optimize(&OptimizeRequest::new(pool.clone(), constraints, Scoring::Balanced, 2), &token)
            .unwrap()
            .lineups()
            .to_vec();
        let req = SimulationRequest::new(pool, Platform::DraftKings, lineups, ContestConfig::gpp(1_000), 500)
            .with_seed(seed);
        let result = engine.simulate(&req, &token).unwrap();
        for l in &result.lineups {
            prop_assert!(l.percentiles.is_ordered());
            prop_assert!((0.0..=1.0).contains(&l.cash_rate));
            prop_assert!((0.0..=1.0).contains(&l.top_20_rate));
        }
        prop_assert!((0.0..=1.0).contains(&result.portfolio.any_cash_rate));
    }
}
