//! Shared constants.

/// Maximum number of distinct roster slots a signature can encode.
pub const MAX_ROSTER_SLOTS: usize = 16;

/// Maximum count of a single roster slot (4 bits per slot in a signature).
pub const MAX_SLOT_COUNT: u8 = 15;

/// Tolerance used when comparing floating point scores.
pub const SCORE_EPSILON: f64 = 1e-9;

/// z-score of the 90th percentile of the standard normal distribution.
/// Floor/ceiling are treated as the 10th/90th percentile outcomes.
pub const Z_90: f64 = 1.281_551_565_544_600_4;

/// Cents per thousand dollars of salary.
pub const CENTS_PER_THOUSAND: f64 = 100_000.0;

/// Top-finish fractions reported by the simulator.
pub const TOP_FRACTIONS: [f64; 3] = [0.01, 0.10, 0.20];
