//! Correlation engine: sparse symmetric player correlations derived from
//! shared grouping keys (team, game, tee-time wave).

pub mod builder;
pub mod matrix;

pub use builder::{build, CorrelationRules};
pub use matrix::{CorrelationGroup, CorrelationMatrix, GroupKind};
