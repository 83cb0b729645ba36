use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::ledger::ApplyPolicy;
use crate::errors::FuelEuError;
use crate::utils::{self, persistence::write_atomic, DEFAULT_LOG_FILTER};

/// Reference target intensity in gCO2e/MJ.
pub const DEFAULT_TARGET_INTENSITY: f64 = 89.3368;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target_intensity: f64,
    pub apply_policy: ApplyPolicy,
    /// Overrides the dataset location; defaults to `<base>/fueleu.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_intensity: DEFAULT_TARGET_INTENSITY,
            apply_policy: ApplyPolicy::default(),
            data_file: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), FuelEuError> {
        if !self.target_intensity.is_finite() || self.target_intensity <= 0.0 {
            return Err(FuelEuError::Config(format!(
                "target_intensity must be a positive number, got {}",
                self.target_intensity
            )));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, FuelEuError> {
        Self::with_base_dir(utils::app_data_dir())
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self, FuelEuError> {
        let base = base.into();
        fs::create_dir_all(utils::config_dir_in(&base)).map_err(config_error)?;
        Ok(Self {
            path: utils::config_file_in(&base),
            base,
        })
    }

    /// Reads the config file, or the defaults when none was saved yet.
    pub fn load(&self) -> Result<Config, FuelEuError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path).map_err(config_error)?;
        let config: Config = serde_json::from_str(&data).map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), FuelEuError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config).map_err(config_error)?;
        write_atomic(&self.path, &json).map_err(config_error)?;
        tracing::info!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    /// Dataset location for `config`, resolved against the base directory.
    pub fn data_file(&self, config: &Config) -> PathBuf {
        match &config.data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base.join(path),
            None => utils::data_file_in(&self.base),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn config_error(err: impl std::fmt::Display) -> FuelEuError {
    FuelEuError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_returns_defaults_when_missing() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.target_intensity, 89.3368);
        assert_eq!(config.apply_policy, ApplyPolicy::AnyBalance);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let config = Config {
            target_intensity: 85.0,
            apply_policy: ApplyPolicy::DeficitOnly,
            data_file: Some(PathBuf::from("custom.json")),
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(manager.data_file(&config), temp.path().join("custom.json"));
    }

    #[test]
    fn partial_files_fall_back_to_field_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        fs::write(manager.path(), r#"{"apply_policy": "deficit_only"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.apply_policy, ApplyPolicy::DeficitOnly);
        assert_eq!(config.target_intensity, DEFAULT_TARGET_INTENSITY);
    }

    #[test]
    fn rejects_non_positive_target() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let config = Config {
            target_intensity: 0.0,
            ..Config::default()
        };
        let err = manager.save(&config).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
