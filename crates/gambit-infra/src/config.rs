//! Global configuration loader for Gambit.
//!
//! Reads `config.toml` from the data directory (`~/.gambit/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed, then applies environment overrides.

use std::path::{Path, PathBuf};

use gambit_types::config::GlobalConfig;

/// Resolve the data directory: `GAMBIT_DATA_DIR` if set, else `~/.gambit`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GAMBIT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gambit")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
///
/// Environment overrides are applied last: `GAMBIT_ENGINE_PATH` for the
/// engine binary and `GAMBIT_MOVE_TIME` for the per-move budget in seconds.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => match toml::from_str::<GlobalConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    "Failed to parse {}: {err}, using defaults",
                    config_path.display()
                );
                GlobalConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    };

    apply_env_overrides(config)
}

fn apply_env_overrides(config: GlobalConfig) -> GlobalConfig {
    apply_overrides(
        config,
        std::env::var("GAMBIT_ENGINE_PATH").ok(),
        std::env::var("GAMBIT_MOVE_TIME").ok(),
    )
}

fn apply_overrides(
    mut config: GlobalConfig,
    engine_path: Option<String>,
    move_time: Option<String>,
) -> GlobalConfig {
    if let Some(path) = engine_path {
        config.engine_path = path;
    }
    if let Some(value) = move_time {
        match value.parse::<f64>() {
            Ok(secs) if secs > 0.0 => config.move_time_secs = secs,
            _ => tracing::warn!("Ignoring invalid GAMBIT_MOVE_TIME '{value}'"),
        }
    }
    config
}
