use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("grid size must be between {min} and {max}, got {got}")]
    GridSize { got: u16, min: u16, max: u16 },

    #[error("expected a colour like #4caf50, got {0:?}")]
    Colour(String),

    #[error("invalid log level {0:?}")]
    LogLevel(String),
}
