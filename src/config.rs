use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::render::Theme;

pub const MIN_GRID_SIZE: u16 = 5;
pub const MAX_GRID_SIZE: u16 = 100;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub grid_size: u16,
    /// Fixed RNG seed for reproducible food placement.
    pub seed: Option<u64>,
    pub theme: Theme,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Logs go nowhere unless a file is given; the terminal belongs to the game.
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig { grid_size: 20, seed: None, theme: Theme::default(), log: LogConfig::default() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { file: None, level: "info".to_string() }
    }
}

/// Values given on the command line. They win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub grid_size: Option<u16>,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl GameConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&text)
    }

    /// Loads `path` if given, otherwise starts from defaults, then applies the
    /// overrides.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(grid_size) = overrides.grid_size {
            config.grid_size = grid_size;
        }
        if overrides.seed.is_some() {
            config.seed = overrides.seed;
        }
        if overrides.log_file.is_some() {
            config.log.file = overrides.log_file;
        }
        if let Some(level) = overrides.log_level {
            config.log.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::GridSize { got: self.grid_size, min: MIN_GRID_SIZE, max: MAX_GRID_SIZE });
        }
        self.log.filter()?;
        Ok(())
    }
}

impl LogConfig {
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn filter(&self) -> Result<EnvFilter, ConfigError> {
        let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
            Ok(from_env) if !from_env.is_empty() => EnvFilter::try_new(from_env),
            _ => EnvFilter::try_new(&self.level),
        };
        filter.map_err(|_| ConfigError::LogLevel(self.level.clone()))
    }
}
