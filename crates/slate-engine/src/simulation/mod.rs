//! Monte Carlo contest simulation.
//!
//! Correlated player draws (one shared shock per correlation group plus an
//! idiosyncratic term), chunked iteration with one ChaCha8 stream per
//! chunk, payout lines resolved against the simulated field, and per-lineup
//! and portfolio statistics.

pub mod monte_carlo;
pub mod payout;
pub mod sampler;
pub mod stats;

pub use monte_carlo::{MonteCarloSimulator, SampleRun};
pub use payout::PayoutTable;
pub use sampler::CorrelatedSampler;
pub use stats::{evaluate, percentile, Evaluation};
