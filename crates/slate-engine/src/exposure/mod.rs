//! Exposure manager: builds a K-lineup set from repeated optimizer calls
//! while steering per-player exposure and lineup diversity.

pub mod manager;
pub mod report;

pub use manager::{ExposureManager, ExposureOutcome, SetStats};
pub use report::summarize;
