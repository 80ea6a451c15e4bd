//! Configuration system for slate.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod analytics_config;
pub mod cache_config;
pub mod correlation_config;
pub mod exposure_config;
pub mod optimizer_config;
pub mod scoring_config;
pub mod simulator_config;
pub mod slate_config;

pub use analytics_config::AnalyticsConfig;
pub use cache_config::CacheConfig;
pub use correlation_config::CorrelationConfig;
pub use exposure_config::ExposureConfig;
pub use optimizer_config::{ModeLimitsConfig, OptimizerConfig, SearchLimits};
pub use scoring_config::{ScoringConfig, ScoringWeights};
pub use simulator_config::SimulatorConfig;
pub use slate_config::{CliOverrides, SlateConfig};
