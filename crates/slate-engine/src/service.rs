//! SlateEngine: request validation, caching, deadlines and progress around
//! the optimizer and the simulator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::ThreadPool;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use slate_core::config::{
    AnalyticsConfig, CorrelationConfig, ExposureConfig, OptimizerConfig, ScoringConfig,
};
use slate_core::events::{ProgressEvent, ProgressKind, ProgressReporter};
use slate_core::{
    CacheKey, CacheLookup, CachedValue, Cancellable, CancellationToken, Computed, ConfigError,
    ContestConfig, Constraints, GeneratedLineup, InfeasibleReport, OptimizationMetadata,
    OptimizationResult, OptimizeError, OptimizeOutcome, PayoutLine, PayoutTier, PerformanceMode,
    Platform, Player, PlayerId, ResultCache, SimulationError, SimulationResult, SlateConfig,
    Strategy, ValidationError,
};

use crate::analytics::{AnalyticsBatch, AnalyticsEngine};
use crate::cache::{pool_fingerprint, request_key};
use crate::correlation::{build, CorrelationMatrix, CorrelationRules};
use crate::exposure::{ExposureManager, ExposureOutcome};
use crate::optimizer::LineupOptimizer;
use crate::simulation::{evaluate, CorrelatedSampler, MonteCarloSimulator};

/// Generate `lineup_count` lineups from a pool.
#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub pool: Vec<Player>,
    pub constraints: Constraints,
    pub strategy: Strategy,
    pub lineup_count: usize,
    /// Falls back to `optimizer.default_mode`.
    pub mode: Option<PerformanceMode>,
    /// Not part of the cache key.
    pub timeout: Option<Duration>,
}

impl OptimizeRequest {
    pub fn new(pool: Vec<Player>, constraints: Constraints, strategy: Strategy, lineup_count: usize) -> Self {
        Self {
            pool,
            constraints,
            strategy,
            lineup_count,
            mode: None,
            timeout: None,
        }
    }

    pub fn with_mode(mut self, mode: PerformanceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Simulate a lineup set in a contest.
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub pool: Vec<Player>,
    pub platform: Platform,
    pub lineups: Vec<GeneratedLineup>,
    pub contest: ContestConfig,
    pub iterations: u32,
    /// Drawn at random and reported when absent. Unseeded runs are never cached.
    pub seed: Option<u64>,
    pub timeout: Option<Duration>,
}

impl SimulationRequest {
    pub fn new(
        pool: Vec<Player>,
        platform: Platform,
        lineups: Vec<GeneratedLineup>,
        contest: ContestConfig,
        iterations: u32,
    ) -> Self {
        Self {
            pool,
            platform,
            lineups,
            contest,
            iterations,
            seed: None,
            timeout: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Serialize)]
struct OptimizeKey<'r> {
    constraints: &'r Constraints,
    strategy: Strategy,
    lineup_count: usize,
    mode: PerformanceMode,
    optimizer: &'r OptimizerConfig,
    scoring: &'r ScoringConfig,
    exposure: &'r ExposureConfig,
    correlation: &'r CorrelationConfig,
    analytics: &'r AnalyticsConfig,
}

#[derive(Serialize)]
struct SimulateKey<'r> {
    platform: Platform,
    lineups: Vec<Vec<PlayerId>>,
    contest: &'r ContestConfig,
    iterations: u32,
    seed: u64,
    chunk_size: u32,
    cash_multiplier: f64,
    correlation: &'r CorrelationConfig,
    analytics: &'r AnalyticsConfig,
}

/// Lineup optimization and contest simulation over an injected result
/// cache and progress reporter.
pub struct SlateEngine {
    config: SlateConfig,
    cache: Arc<dyn ResultCache>,
    reporter: Arc<dyn ProgressReporter>,
    workers: ThreadPool,
    analytics: AnalyticsEngine,
    rules: CorrelationRules,
}

impl SlateEngine {
    pub fn new(
        config: SlateConfig,
        cache: Arc<dyn ResultCache>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let threads = config.simulation.effective_workers();
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("slate-sim-{i}"))
            .build()
            .map_err(|e| ConfigError::ValidationFailed {
                field: "simulation.workers".to_string(),
                message: e.to_string(),
            })?;
        info!(workers = threads, "slate engine ready");
        Ok(Self {
            analytics: AnalyticsEngine::new(&config.analytics),
            rules: CorrelationRules::from_config(&config.correlation),
            config,
            cache,
            reporter,
            workers,
        })
    }

    pub fn config(&self) -> &SlateConfig {
        &self.config
    }

    /// Correlation groups of a pool under the configured rules.
    pub fn correlation_matrix(&self, pool: &[Player]) -> CorrelationMatrix {
        build(pool, &self.rules)
    }

    /// Derived per-player metrics for a platform.
    pub fn analyze(&self, pool: &[Player], platform: Platform) -> AnalyticsBatch {
        self.analytics.analyze(pool, platform)
    }

    /// Drop every cached result computed from `pool`.
    pub fn invalidate_pool(&self, pool: &[Player]) {
        let fingerprint = pool_fingerprint(pool);
        if let Err(e) = self.cache.invalidate_pool(fingerprint) {
            warn!(error = %e, fingerprint, "cache invalidation failed");
        }
    }

    /// Build a lineup set. Infeasibility and deadlines are outcomes; only
    /// malformed requests are errors.
    #[instrument(skip(self, request, token), fields(strategy = %request.strategy, k = request.lineup_count))]
    pub fn optimize(
        &self,
        request: &OptimizeRequest,
        token: &CancellationToken,
    ) -> Result<OptimizeOutcome, OptimizeError> {
        if request.lineup_count == 0 {
            return Err(ValidationError::ZeroLineups.into());
        }
        request.constraints.validate(&request.pool)?;

        let mode = request
            .mode
            .unwrap_or_else(|| self.config.optimizer.effective_default_mode());
        let token = match request.timeout {
            Some(timeout) => token.with_timeout(timeout),
            None => token.clone(),
        };
        let k = request.lineup_count;
        self.reporter.try_emit(ProgressEvent::new(
            ProgressKind::OptimizationStarted,
            0,
            k as u32,
            format!("optimizing {k} lineups ({mode})"),
        ));

        let fingerprint = pool_fingerprint(&request.pool);
        let key = request_key(
            "optimize",
            fingerprint,
            &OptimizeKey {
                constraints: &request.constraints,
                strategy: request.strategy,
                lineup_count: k,
                mode,
                optimizer: &self.config.optimizer,
                scoring: &self.config.scoring,
                exposure: &self.config.exposure,
                correlation: &self.config.correlation,
                analytics: &self.config.analytics,
            },
        );
        let mut compute = || {
            let outcome = self.run_optimize(request, mode, &token);
            let cacheable = outcome.is_cacheable();
            let value = CachedValue::Optimization(Arc::new(outcome));
            if cacheable {
                Computed::Store(value)
            } else {
                Computed::Bypass(value)
            }
        };
        let lookup = self.through_cache(key, self.config.cache.optimization_ttl(), &mut compute);
        let mut outcome = match lookup.value {
            CachedValue::Optimization(outcome) => Arc::unwrap_or_clone(outcome),
            CachedValue::Simulation(_) => {
                warn!("cache returned a simulation for an optimization key");
                self.run_optimize(request, mode, &token)
            }
        };
        outcome.metadata_mut().cache_hit = lookup.hit;

        let (message, status) = match &outcome {
            OptimizeOutcome::Optimized(r) => (format!("{} of {k} lineups", r.lineups.len()), "optimized"),
            OptimizeOutcome::Infeasible(r) => (format!("infeasible: {}", r.reason), "infeasible"),
            OptimizeOutcome::Timeout(_) => ("stopped before the first lineup".to_string(), "timeout"),
        };
        self.reporter
            .emit_final(ProgressEvent::finished(ProgressKind::OptimizationComplete, k as u32, message));
        let meta = outcome.metadata();
        info!(
            status,
            lineups = outcome.lineups().len(),
            elapsed_ms = meta.elapsed_ms,
            cache_hit = meta.cache_hit,
            partial = meta.partial,
            "optimization finished"
        );
        Ok(outcome)
    }

    fn run_optimize(
        &self,
        request: &OptimizeRequest,
        mode: PerformanceMode,
        token: &CancellationToken,
    ) -> OptimizeOutcome {
        let started = Instant::now();
        let constraints = &request.constraints;
        let analytics = self.analytics.analyze(&request.pool, constraints.platform);
        let matrix = build(&request.pool, &self.rules);
        let optimizer = LineupOptimizer::new(
            &request.pool,
            constraints,
            request.strategy,
            self.config.scoring.weights(),
            &analytics,
            &matrix,
            self.config.optimizer.limits_for(mode),
        );
        let manager = ExposureManager::new(
            &optimizer,
            constraints,
            self.config.exposure.effective_max_retries(),
            self.reporter.as_ref(),
        );
        let built = manager.build(request.lineup_count, token);

        let mut metadata = OptimizationMetadata::new(request.strategy, mode);
        metadata.elapsed_ms = started.elapsed().as_millis() as u64;
        match built {
            ExposureOutcome::Built {
                lineups,
                report,
                partial,
                stats,
            } => {
                metadata.states_explored = stats.nodes;
                metadata.memo_entries = stats.memo_entries;
                metadata.partial = partial;
                debug!(
                    searches = stats.searches,
                    nodes = stats.nodes,
                    memo = stats.memo_entries,
                    "lineup set search stats"
                );
                if lineups.is_empty() {
                    OptimizeOutcome::Timeout(metadata)
                } else {
                    OptimizeOutcome::Optimized(OptimizationResult {
                        lineups,
                        exposure: report,
                        metadata,
                    })
                }
            }
            ExposureOutcome::Infeasible { reason, stats } => {
                metadata.states_explored = stats.nodes;
                metadata.memo_entries = stats.memo_entries;
                OptimizeOutcome::Infeasible(InfeasibleReport { reason, metadata })
            }
        }
    }

    /// Simulate a lineup set. Stopping early yields a partial result; zero
    /// completed iterations is an error.
    #[instrument(skip(self, request, token), fields(lineups = request.lineups.len(), iterations = request.iterations))]
    pub fn simulate(
        &self,
        request: &SimulationRequest,
        token: &CancellationToken,
    ) -> Result<SimulationResult, SimulationError> {
        self.validate_simulation(request)?;

        let seed = request.seed.unwrap_or_else(rand::random);
        let token = match request.timeout {
            Some(timeout) => token.with_timeout(timeout),
            None => token.clone(),
        };
        let iterations = request.iterations;
        self.reporter.try_emit(ProgressEvent::new(
            ProgressKind::SimulationStarted,
            0,
            iterations,
            format!("simulating {} lineups, seed {seed}", request.lineups.len()),
        ));

        let key = request.seed.and_then(|seed| {
            request_key(
                "simulate",
                pool_fingerprint(&request.pool),
                &SimulateKey {
                    platform: request.platform,
                    lineups: request.lineups.iter().map(|l| l.player_ids().collect()).collect(),
                    contest: &request.contest,
                    iterations,
                    seed,
                    chunk_size: self.config.simulation.effective_chunk_size(),
                    cash_multiplier: self.config.simulation.effective_cash_multiplier(),
                    correlation: &self.config.correlation,
                    analytics: &self.config.analytics,
                },
            )
        });
        let mut failure = None;
        let mut compute = || match self.run_simulation(request, seed, &token) {
            Ok(result) => {
                let partial = result.partial;
                let value = CachedValue::Simulation(Arc::new(result));
                if partial {
                    Computed::Bypass(value)
                } else {
                    Computed::Store(value)
                }
            }
            Err(e) => {
                failure = Some(e);
                Computed::Bypass(CachedValue::Simulation(Arc::new(empty_result(request, seed))))
            }
        };
        let lookup = self.through_cache(key, self.config.cache.simulation_ttl(), &mut compute);

        let result = match (failure, lookup.value) {
            (Some(e), _) => Err(e),
            (None, CachedValue::Simulation(result)) if result.iterations_completed == 0 => {
                Err(stopped_error(&token))
            }
            (None, CachedValue::Simulation(result)) => {
                let mut result = Arc::unwrap_or_clone(result);
                result.cache_hit = lookup.hit;
                Ok(result)
            }
            (None, CachedValue::Optimization(_)) => {
                warn!("cache returned an optimization for a simulation key");
                self.run_simulation(request, seed, &token)
            }
        };

        let message = match &result {
            Ok(r) => format!("{} of {iterations} iterations", r.iterations_completed),
            Err(e) => e.to_string(),
        };
        self.reporter
            .emit_final(ProgressEvent::finished(ProgressKind::SimulationComplete, iterations, message));
        match &result {
            Ok(r) => info!(
                seed,
                completed = r.iterations_completed,
                partial = r.partial,
                cache_hit = r.cache_hit,
                elapsed_ms = r.elapsed_ms,
                "simulation finished"
            ),
            Err(e) => warn!(error = %e, "simulation failed"),
        }
        result
    }

    fn validate_simulation(&self, request: &SimulationRequest) -> Result<(), ValidationError> {
        if request.iterations == 0 {
            return Err(ValidationError::NonPositiveIterations);
        }
        let max = self.config.simulation.effective_max_iterations();
        if request.iterations > max {
            return Err(ValidationError::TooManyIterations {
                requested: request.iterations,
                max,
            });
        }
        if request.pool.is_empty() {
            return Err(ValidationError::EmptyPool);
        }
        if request.lineups.is_empty() {
            return Err(ValidationError::EmptyLineupSet);
        }
        let mut known = FxHashSet::default();
        for p in &request.pool {
            if !known.insert(p.id) {
                return Err(ValidationError::DuplicatePlayer(p.id));
            }
        }
        let size = request.lineups[0].len();
        for (index, lineup) in request.lineups.iter().enumerate() {
            if lineup.is_empty() {
                return Err(ValidationError::InvalidLineup {
                    index,
                    message: "lineup has no players".to_string(),
                });
            }
            if lineup.len() != size {
                return Err(ValidationError::InvalidLineup {
                    index,
                    message: format!("{} players, expected {size}", lineup.len()),
                });
            }
            let mut seen = FxHashSet::default();
            for id in lineup.player_ids() {
                if !known.contains(&id) {
                    return Err(ValidationError::UnknownPlayer(id));
                }
                if !seen.insert(id) {
                    return Err(ValidationError::InvalidLineup {
                        index,
                        message: format!("player {id} appears twice"),
                    });
                }
            }
        }
        if request.contest.entry_fee < 0 {
            return Err(ValidationError::NegativeEntryFee(request.contest.entry_fee));
        }
        if let Some(tiers) = &request.contest.tiers {
            validate_tiers(tiers)?;
        }
        Ok(())
    }

    fn run_simulation(
        &self,
        request: &SimulationRequest,
        seed: u64,
        token: &CancellationToken,
    ) -> Result<SimulationResult, SimulationError> {
        let started = Instant::now();
        let analytics = self.analytics.analyze(&request.pool, request.platform);
        let matrix = build(&request.pool, &self.rules);

        let by_id: FxHashMap<PlayerId, &Player> = request.pool.iter().map(|p| (p.id, p)).collect();
        let mut members: Vec<&Player> = Vec::new();
        let mut seen = FxHashSet::default();
        for id in request.lineups.iter().flat_map(|l| l.player_ids()) {
            if seen.insert(id) {
                if let Some(p) = by_id.get(&id) {
                    members.push(p);
                }
            }
        }
        let sampler = CorrelatedSampler::new(&members, &analytics, &matrix);
        let lineups: Vec<Vec<usize>> = request
            .lineups
            .iter()
            .map(|l| l.player_ids().filter_map(|id| sampler.index_of(id)).collect())
            .collect();

        let run = MonteCarloSimulator::new(request.iterations)
            .with_seed(seed)
            .with_chunk_size(self.config.simulation.effective_chunk_size())
            .run(&sampler, &lineups, &self.workers, token, self.reporter.as_ref())?;

        let tiers = request.contest.tiers.clone().unwrap_or_else(|| {
            request
                .contest
                .kind
                .default_tiers(self.config.simulation.effective_cash_multiplier())
        });
        let evaluation = evaluate(&run, &tiers, request.contest.entry_fee);
        Ok(SimulationResult {
            contest: request.contest.kind,
            lineups: evaluation.lineups,
            portfolio: evaluation.portfolio,
            payout_lines: evaluation.payout_lines,
            iterations_requested: request.iterations,
            iterations_completed: run.completed,
            seed,
            partial: run.partial,
            elapsed_ms: started.elapsed().as_millis() as u64,
            cache_hit: false,
        })
    }

    /// Compute through the cache when enabled, falling back to a direct
    /// computation when the backend fails or the request has no key.
    fn through_cache(
        &self,
        key: Option<CacheKey>,
        ttl: Duration,
        compute: &mut dyn FnMut() -> Computed,
    ) -> CacheLookup {
        if self.config.cache.effective_enabled() {
            match key {
                Some(key) => match self.cache.compute_if_absent(key, ttl, compute) {
                    Ok(lookup) => return lookup,
                    Err(e) => warn!(error = %e, "result cache unavailable; computing uncached"),
                },
                None => debug!("request has no cache key"),
            }
        }
        let value = match compute() {
            Computed::Store(value) | Computed::Bypass(value) => value,
        };
        CacheLookup { value, hit: false }
    }
}

fn validate_tiers(tiers: &[PayoutTier]) -> Result<(), ValidationError> {
    let invalid = |message: String| ValidationError::InvalidInput {
        field: "contest.tiers".to_string(),
        message,
    };
    if tiers.is_empty() {
        return Err(invalid("at least one payout tier is required".to_string()));
    }
    for tier in tiers {
        if !tier.multiplier.is_finite() || tier.multiplier < 0.0 {
            return Err(invalid(format!("multiplier {} must be non-negative", tier.multiplier)));
        }
        match tier.line {
            PayoutLine::FieldPercentile(q) if !(0.0..=1.0).contains(&q) => {
                return Err(invalid(format!("field percentile {q} outside 0..=1")));
            }
            PayoutLine::Score(s) if !s.is_finite() => {
                return Err(invalid(format!("score line {s} is not finite")));
            }
            _ => {}
        }
    }
    Ok(())
}

fn stopped_error(token: &CancellationToken) -> SimulationError {
    if token.is_cancelled() {
        SimulationError::Cancelled
    } else {
        SimulationError::Timeout
    }
}

/// Stand-in shared with single-flight waiters when the run itself failed.
fn empty_result(request: &SimulationRequest, seed: u64) -> SimulationResult {
    SimulationResult {
        contest: request.contest.kind,
        lineups: Vec::new(),
        portfolio: slate_core::PortfolioStats {
            lineup_count: 0,
            mean_expected_score: 0.0,
            mean_cash_rate: 0.0,
            any_cash_rate: 0.0,
            portfolio_roi: 0.0,
            expected_profit: 0,
            best_lineup_index: 0,
        },
        payout_lines: Vec::new(),
        iterations_requested: request.iterations,
        iterations_completed: 0,
        seed,
        partial: true,
        elapsed_ms: 0,
        cache_hit: false,
    }
}
