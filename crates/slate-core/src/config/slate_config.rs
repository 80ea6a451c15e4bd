//! Top-level slate configuration with 4-layer resolution.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    AnalyticsConfig, CacheConfig, CorrelationConfig, ExposureConfig, OptimizerConfig,
    ScoringConfig, SimulatorConfig,
};
use crate::errors::ConfigError;
use crate::types::PerformanceMode;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SLATE_*`)
/// 3. Project config (`slate.toml` in project root)
/// 4. User config (`~/.slate/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SlateConfig {
    pub optimizer: OptimizerConfig,
    pub scoring: ScoringConfig,
    pub exposure: ExposureConfig,
    pub simulation: SimulatorConfig,
    pub correlation: CorrelationConfig,
    pub analytics: AnalyticsConfig,
    pub cache: CacheConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub workers: Option<usize>,
    pub default_mode: Option<PerformanceMode>,
    pub cache_enabled: Option<bool>,
    pub max_iterations: Option<u32>,
}

/// Copy every `Some` field of `$other.$section` over `$base.$section`.
macro_rules! merge_fields {
    ($base:ident, $other:ident, $section:ident { $($field:ident),+ $(,)? }) => {
        $(
            if $other.$section.$field.is_some() {
                $base.$section.$field = $other.$section.$field.clone();
            }
        )+
    };
}

/// Parse `$var` into the given field when set and well-formed.
macro_rules! env_override {
    ($config:ident, $var:literal, $ty:ty => $($path:ident).+) => {
        if let Ok(val) = std::env::var($var) {
            match val.trim().parse::<$ty>() {
                Ok(v) => $config.$($path).+ = Some(v),
                Err(_) => tracing::warn!(var = $var, value = %val, "ignoring malformed env override"),
            }
        }
    };
}

impl SlateConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join("slate.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn fail(field: &str, message: &str) -> Result<(), ConfigError> {
            Err(ConfigError::ValidationFailed {
                field: field.to_string(),
                message: message.to_string(),
            })
        }
        fn non_negative(field: &str, value: Option<f64>) -> Result<(), ConfigError> {
            match value {
                Some(v) if !v.is_finite() || v < 0.0 => fail(field, "must be a finite non-negative number"),
                _ => Ok(()),
            }
        }

        if self.optimizer.poll_interval == Some(0) {
            return fail("optimizer.poll_interval", "must be greater than 0");
        }
        for (name, section) in [
            ("speed", &self.optimizer.speed),
            ("balanced", &self.optimizer.balanced),
            ("quality", &self.optimizer.quality),
        ] {
            if section.max_buckets == Some(0) {
                return fail(&format!("optimizer.{name}.max_buckets"), "must be greater than 0");
            }
            if section.node_budget == Some(0) {
                return fail(&format!("optimizer.{name}.node_budget"), "must be greater than 0");
            }
        }

        let s = &self.scoring;
        non_negative("scoring.ceiling_prob_weight", s.ceiling_prob_weight)?;
        non_negative("scoring.floor_prob_weight", s.floor_prob_weight)?;
        non_negative("scoring.balanced_projection_weight", s.balanced_projection_weight)?;
        non_negative("scoring.balanced_floor_weight", s.balanced_floor_weight)?;
        non_negative("scoring.balanced_ceiling_weight", s.balanced_ceiling_weight)?;
        non_negative("scoring.contrarian_penalty", s.contrarian_penalty)?;
        non_negative("scoring.correlation_weight", s.correlation_weight)?;

        if self.exposure.max_retries == Some(0) {
            return fail("exposure.max_retries", "must be greater than 0");
        }

        if self.simulation.chunk_size == Some(0) {
            return fail("simulation.chunk_size", "must be greater than 0");
        }
        if self.simulation.max_iterations == Some(0) {
            return fail("simulation.max_iterations", "must be greater than 0");
        }
        non_negative("simulation.cash_multiplier", self.simulation.cash_multiplier)?;

        for (field, value) in [
            ("correlation.same_team", self.correlation.same_team),
            ("correlation.same_game", self.correlation.same_game),
            ("correlation.same_wave", self.correlation.same_wave),
        ] {
            if let Some(v) = value {
                if !(-1.0..=1.0).contains(&v) {
                    return fail(field, "must be between -1.0 and 1.0");
                }
            }
        }

        non_negative("analytics.ceiling_multiplier", self.analytics.ceiling_multiplier)?;
        non_negative("analytics.floor_multiplier", self.analytics.floor_multiplier)?;
        non_negative("analytics.default_spread", self.analytics.default_spread)?;
        if let Some(w) = self.analytics.history_weight {
            if !(0.0..=1.0).contains(&w) {
                return fail("analytics.history_weight", "must be between 0.0 and 1.0");
            }
        }
        if self.analytics.min_history.is_some_and(|n| n < 2) {
            return fail("analytics.min_history", "must be at least 2");
        }

        if self.cache.max_entries == Some(0) {
            return fail("cache.max_entries", "must be greater than 0");
        }
        Ok(())
    }

    /// Returns the user config path: `~/.slate/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".slate").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut SlateConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let file_config: SlateConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), "merged config file");
        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut SlateConfig, other: &SlateConfig) {
        merge_fields!(base, other, optimizer { default_mode, poll_interval });
        for (b, o) in [
            (&mut base.optimizer.speed, &other.optimizer.speed),
            (&mut base.optimizer.balanced, &other.optimizer.balanced),
            (&mut base.optimizer.quality, &other.optimizer.quality),
        ] {
            if o.candidates_per_slot.is_some() {
                b.candidates_per_slot = o.candidates_per_slot;
            }
            if o.max_buckets.is_some() {
                b.max_buckets = o.max_buckets;
            }
            if o.node_budget.is_some() {
                b.node_budget = o.node_budget;
            }
        }
        merge_fields!(base, other, scoring {
            ceiling_prob_weight,
            floor_prob_weight,
            balanced_projection_weight,
            balanced_floor_weight,
            balanced_ceiling_weight,
            contrarian_penalty,
            correlation_weight,
        });
        merge_fields!(base, other, exposure { max_retries });
        merge_fields!(base, other, simulation {
            workers,
            chunk_size,
            max_iterations,
            cash_multiplier,
        });
        merge_fields!(base, other, correlation { same_team, same_game, same_wave });
        merge_fields!(base, other, analytics {
            ceiling_multiplier,
            floor_multiplier,
            default_spread,
            min_history,
            history_weight,
        });
        merge_fields!(base, other, cache {
            enabled,
            max_entries,
            optimization_ttl_secs,
            simulation_ttl_secs,
        });
    }

    /// Apply environment variable overrides.
    /// Pattern: `SLATE_<SECTION>_<FIELD>`.
    fn apply_env_overrides(config: &mut SlateConfig) {
        if let Ok(val) = std::env::var("SLATE_OPTIMIZER_DEFAULT_MODE") {
            match PerformanceMode::from_str(val.trim()) {
                Ok(mode) => config.optimizer.default_mode = Some(mode),
                Err(_) => tracing::warn!(value = %val, "ignoring unknown SLATE_OPTIMIZER_DEFAULT_MODE"),
            }
        }
        env_override!(config, "SLATE_EXPOSURE_MAX_RETRIES", u32 => exposure.max_retries);
        env_override!(config, "SLATE_SIMULATION_WORKERS", usize => simulation.workers);
        env_override!(config, "SLATE_SIMULATION_CHUNK_SIZE", u32 => simulation.chunk_size);
        env_override!(config, "SLATE_SIMULATION_MAX_ITERATIONS", u32 => simulation.max_iterations);
        env_override!(config, "SLATE_CACHE_ENABLED", bool => cache.enabled);
        env_override!(config, "SLATE_CACHE_MAX_ENTRIES", u64 => cache.max_entries);
        env_override!(config, "SLATE_CACHE_TTL_SECS", u64 => cache.optimization_ttl_secs);
        env_override!(config, "SLATE_CACHE_TTL_SECS", u64 => cache.simulation_ttl_secs);
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SlateConfig, cli: &CliOverrides) {
        if let Some(v) = cli.workers {
            config.simulation.workers = Some(v);
        }
        if let Some(v) = cli.default_mode {
            config.optimizer.default_mode = Some(v);
        }
        if let Some(v) = cli.cache_enabled {
            config.cache.enabled = Some(v);
        }
        if let Some(v) = cli.max_iterations {
            config.simulation.max_iterations = Some(v);
        }
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
