//! Tests for the slate configuration system.

use std::sync::Mutex;
use std::time::Duration;

use slate_core::config::{CliOverrides, SlateConfig};
use slate_core::errors::{ConfigError, SlateErrorCode};
use slate_core::PerformanceMode;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const SLATE_VARS: &[&str] = &[
    "SLATE_OPTIMIZER_DEFAULT_MODE",
    "SLATE_EXPOSURE_MAX_RETRIES",
    "SLATE_SIMULATION_WORKERS",
    "SLATE_SIMULATION_CHUNK_SIZE",
    "SLATE_SIMULATION_MAX_ITERATIONS",
    "SLATE_CACHE_ENABLED",
    "SLATE_CACHE_MAX_ENTRIES",
    "SLATE_CACHE_TTL_SECS",
];

fn clear_slate_env_vars() {
    for key in SLATE_VARS {
        std::env::remove_var(key);
    }
}

/// Points HOME at an empty directory so a developer's own
/// `~/.slate/config.toml` cannot leak into the test.
fn isolated_home() -> tempfile::TempDir {
    let home = tempfile::TempDir::new().unwrap();
    std::env::set_var("HOME", home.path());
    home
}

#[test]
fn four_layer_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_slate_env_vars();
    let home = isolated_home();

    let user_dir = home.path().join(".slate");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(
        user_dir.join("config.toml"),
        r#"
[simulation]
workers = 2
chunk_size = 256

[correlation]
same_wave = 0.4
"#,
    )
    .unwrap();

    let project = tempfile::TempDir::new().unwrap();
    std::fs::write(
        project.path().join("slate.toml"),
        r#"
[simulation]
chunk_size = 512
max_iterations = 50000

[exposure]
max_retries = 3
"#,
    )
    .unwrap();

    std::env::set_var("SLATE_SIMULATION_MAX_ITERATIONS", "75000");
    std::env::set_var("SLATE_EXPOSURE_MAX_RETRIES", "4");

    let cli = CliOverrides {
        max_iterations: Some(90_000),
        ..Default::default()
    };
    let config = SlateConfig::load(project.path(), Some(&cli)).unwrap();

    // user only
    assert_eq!(config.simulation.workers, Some(2));
    assert_eq!(config.correlation.effective_same_wave(), 0.4);
    // project beats user
    assert_eq!(config.simulation.effective_chunk_size(), 512);
    // env beats project
    assert_eq!(config.exposure.effective_max_retries(), 4);
    // cli beats env
    assert_eq!(config.simulation.effective_max_iterations(), 90_000);

    clear_slate_env_vars();
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_slate_env_vars();
    let _home = isolated_home();

    let project = tempfile::TempDir::new().unwrap();
    let config = SlateConfig::load(project.path(), None).unwrap();

    assert_eq!(config, SlateConfig::default());
    assert_eq!(config.optimizer.effective_default_mode(), PerformanceMode::Balanced);
    assert_eq!(config.exposure.effective_max_retries(), 5);
    assert_eq!(config.simulation.effective_max_iterations(), 1_000_000);
    assert_eq!(config.simulation.effective_cash_multiplier(), 1.8);
    assert_eq!(config.correlation.effective_same_team(), 0.2);
    assert_eq!(config.correlation.effective_same_game(), 0.1);
    assert_eq!(config.correlation.effective_same_wave(), 0.3);
    assert!(config.cache.effective_enabled());
    assert_eq!(config.cache.optimization_ttl(), Duration::from_secs(300));
    assert_eq!(config.cache.simulation_ttl(), Duration::from_secs(900));
}

#[test]
fn env_overrides_parse_typed_values() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_slate_env_vars();
    let _home = isolated_home();

    std::env::set_var("SLATE_OPTIMIZER_DEFAULT_MODE", "Quality");
    std::env::set_var("SLATE_CACHE_ENABLED", "false");
    std::env::set_var("SLATE_CACHE_TTL_SECS", "60");
    std::env::set_var("SLATE_SIMULATION_WORKERS", "not-a-number");

    let project = tempfile::TempDir::new().unwrap();
    let config = SlateConfig::load(project.path(), None).unwrap();

    assert_eq!(config.optimizer.effective_default_mode(), PerformanceMode::Quality);
    assert!(!config.cache.effective_enabled());
    assert_eq!(config.cache.optimization_ttl(), Duration::from_secs(60));
    assert_eq!(config.cache.simulation_ttl(), Duration::from_secs(60));
    // malformed values are ignored
    assert_eq!(config.simulation.workers, None);

    clear_slate_env_vars();
}

#[test]
fn invalid_project_toml_is_a_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_slate_env_vars();
    let _home = isolated_home();

    let project = tempfile::TempDir::new().unwrap();
    std::fs::write(project.path().join("slate.toml"), "[simulation\nworkers = ").unwrap();

    let err = SlateConfig::load(project.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn validation_rejects_out_of_range_values() {
    let cases = [
        ("[simulation]\nchunk_size = 0", "simulation.chunk_size"),
        ("[correlation]\nsame_team = 1.5", "correlation.same_team"),
        ("[analytics]\nhistory_weight = 2.0", "analytics.history_weight"),
        ("[exposure]\nmax_retries = 0", "exposure.max_retries"),
        ("[optimizer.speed]\nnode_budget = 0", "optimizer.speed.node_budget"),
        ("[scoring]\ncontrarian_penalty = -1.0", "scoring.contrarian_penalty"),
    ];
    for (toml, expected_field) in cases {
        match SlateConfig::from_toml(toml) {
            Err(ConfigError::ValidationFailed { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected validation failure for {expected_field}, got {other:?}"),
        }
    }
}

#[test]
fn toml_round_trip_preserves_values() {
    let config = SlateConfig::from_toml(
        r#"
[optimizer]
default_mode = "speed"
poll_interval = 512

[optimizer.quality]
candidates_per_slot = 0
node_budget = 1000000

[scoring]
correlation_weight = 0.75

[cache]
max_entries = 10
"#,
    )
    .unwrap();

    let serialized = config.to_toml().unwrap();
    let back = SlateConfig::from_toml(&serialized).unwrap();
    assert_eq!(back, config);

    let quality = back.optimizer.limits_for(PerformanceMode::Quality);
    assert_eq!(quality.candidates_per_slot, None);
    assert_eq!(quality.node_budget, 1_000_000);
    assert_eq!(quality.max_buckets, 1_000);
    assert_eq!(quality.poll_interval, 512);
    assert_eq!(back.scoring.weights().correlation, 0.75);
}

#[test]
fn mode_limits_scale_with_effort() {
    let config = SlateConfig::default();
    let speed = config.optimizer.limits_for(PerformanceMode::Speed);
    let balanced = config.optimizer.limits_for(PerformanceMode::Balanced);
    let quality = config.optimizer.limits_for(PerformanceMode::Quality);

    assert_eq!(speed.candidates_per_slot, Some(10));
    assert_eq!(balanced.candidates_per_slot, Some(20));
    assert_eq!(quality.candidates_per_slot, Some(40));
    assert!(speed.max_buckets < balanced.max_buckets && balanced.max_buckets < quality.max_buckets);
    assert!(speed.node_budget < balanced.node_budget && balanced.node_budget < quality.node_budget);
}
