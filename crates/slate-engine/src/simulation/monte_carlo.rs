//! Chunked, seeded Monte Carlo runner.

use std::sync::atomic::{AtomicU32, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPool;

use slate_core::events::{ProgressEvent, ProgressKind, ProgressReporter};
use slate_core::{Cancellable, CancellationToken, SimulationError};

use super::sampler::CorrelatedSampler;

/// Iterations are split into fixed-size chunks; chunk `c` draws from its
/// own ChaCha8 stream seeded with `seed + c`. Output for a seed is
/// therefore identical whatever the number of workers.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloSimulator {
    iterations: u32,
    seed: u64,
    chunk_size: u32,
}

/// Lineup scores per completed iteration.
#[derive(Debug, Clone)]
pub struct SampleRun {
    /// `scores[l][i]`: score of lineup `l` in the `i`-th completed iteration.
    pub scores: Vec<Vec<f64>>,
    pub completed: u32,
    /// Some chunks were skipped by cancellation or the deadline.
    pub partial: bool,
}

impl MonteCarloSimulator {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations,
            seed: 0,
            chunk_size: 1024,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_count(&self) -> u32 {
        self.iterations.div_ceil(self.chunk_size)
    }

    /// Score every lineup (given as sampler indices) in every iteration.
    ///
    /// Blocks until all chunks finish or the token stops new chunks from
    /// starting. Zero completed iterations is an error, never an empty run.
    pub fn run(
        &self,
        sampler: &CorrelatedSampler,
        lineups: &[Vec<usize>],
        pool: &ThreadPool,
        token: &CancellationToken,
        reporter: &dyn ProgressReporter,
    ) -> Result<SampleRun, SimulationError> {
        let done = AtomicU32::new(0);
        let chunks = self.chunk_count();
        let blocks: Vec<Option<Vec<f64>>> = pool.install(|| {
            (0..chunks)
                .into_par_iter()
                .map(|c| {
                    if token.should_stop() {
                        return None;
                    }
                    let block = self.run_chunk(c, sampler, lineups);
                    let len = self.chunk_len(c);
                    let completed = done.fetch_add(len, Ordering::Relaxed) + len;
                    reporter.try_emit(ProgressEvent::new(
                        ProgressKind::SimulationProgress,
                        completed,
                        self.iterations,
                        format!("{completed} of {} iterations", self.iterations),
                    ));
                    Some(block)
                })
                .collect()
        });

        let mut scores: Vec<Vec<f64>> = lineups
            .iter()
            .map(|_| Vec::with_capacity(self.iterations as usize))
            .collect();
        let mut completed = 0u32;
        let mut partial = false;
        for block in blocks {
            let Some(block) = block else {
                partial = true;
                continue;
            };
            for row in block.chunks_exact(lineups.len().max(1)) {
                for (l, &v) in row.iter().enumerate() {
                    scores[l].push(v);
                }
                completed += 1;
            }
        }

        if completed == 0 && self.iterations > 0 {
            return Err(if token.is_cancelled() {
                SimulationError::Cancelled
            } else {
                SimulationError::Timeout
            });
        }
        Ok(SampleRun {
            scores,
            completed,
            partial,
        })
    }

    fn chunk_len(&self, chunk: u32) -> u32 {
        let start = chunk * self.chunk_size;
        self.chunk_size.min(self.iterations - start)
    }

    /// Iteration-major block of `chunk_len * lineups.len()` scores.
    fn run_chunk(&self, chunk: u32, sampler: &CorrelatedSampler, lineups: &[Vec<usize>]) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(u64::from(chunk)));
        let len = self.chunk_len(chunk) as usize;
        let mut draws = vec![0.0; sampler.len()];
        let mut shocks = Vec::with_capacity(sampler.shock_count());
        let mut block = Vec::with_capacity(len * lineups.len());
        for _ in 0..len {
            sampler.draw(&mut rng, &mut shocks, &mut draws);
            block.extend(lineups.iter().map(|members| members.iter().map(|&i| draws[i]).sum::<f64>()));
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsEngine;
    use crate::correlation::{build, CorrelationRules};
    use slate_core::events::NoopReporter;
    use slate_core::{Platform, Player};

    fn sampler() -> CorrelatedSampler {
        let pool: Vec<Player> = (1..=4)
            .map(|i| {
                Player::new(i, &["G"], Platform::DraftKings, 500_000, 20.0)
                    .with_range(10.0, 30.0)
                    .with_team(if i <= 2 { "A" } else { "B" }, "G1")
            })
            .collect();
        let matrix = build(&pool, &CorrelationRules::default());
        let analytics = AnalyticsEngine::default().analyze(&pool, Platform::DraftKings);
        let players: Vec<&Player> = pool.iter().collect();
        CorrelatedSampler::new(&players, &analytics, &matrix)
    }

    fn thread_pool(n: usize) -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(n).build().unwrap()
    }

    #[test]
    fn identical_across_worker_counts() {
        let s = sampler();
        let lineups = vec![vec![0, 1], vec![2, 3]];
        let sim = MonteCarloSimulator::new(5_000).with_seed(42).with_chunk_size(256);
        let token = CancellationToken::new();
        let one = sim.run(&s, &lineups, &thread_pool(1), &token, &NoopReporter).unwrap();
        let four = sim.run(&s, &lineups, &thread_pool(4), &token, &NoopReporter).unwrap();
        assert_eq!(one.completed, 5_000);
        assert!(!one.partial);
        assert_eq!(one.scores, four.scores);
    }

    #[test]
    fn different_seeds_differ() {
        let s = sampler();
        let lineups = vec![vec![0, 1]];
        let token = CancellationToken::new();
        let pool = thread_pool(2);
        let a = MonteCarloSimulator::new(100).with_seed(1).run(&s, &lineups, &pool, &token, &NoopReporter).unwrap();
        let b = MonteCarloSimulator::new(100).with_seed(2).run(&s, &lineups, &pool, &token, &NoopReporter).unwrap();
        assert_ne!(a.scores, b.scores);
    }

    #[test]
    fn cancelled_before_start_is_an_error() {
        let s = sampler();
        let token = CancellationToken::new();
        token.cancel();
        let err = MonteCarloSimulator::new(1_000)
            .run(&s, &[vec![0]], &thread_pool(2), &token, &NoopReporter)
            .unwrap_err();
        assert!(matches!(err, SimulationError::Cancelled));
    }

    #[test]
    fn chunk_arithmetic() {
        let sim = MonteCarloSimulator::new(2_500).with_chunk_size(1_000);
        assert_eq!(sim.chunk_count(), 3);
        assert_eq!(sim.chunk_len(2), 500);
    }
}
