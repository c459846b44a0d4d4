use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::options::Options;
use crate::shared::constants::{CONFIG_DIR_NAME, OPTIONS_FILE_NAME, STATE_FILE_NAME};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read options from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse options in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot serialize options for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot write options to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options: {0}")]
    Invalid(String),
}

/// Locates and bootstraps the configuration directory.
///
/// Layout:
/// - `options.json`: playback options, written with defaults on first run
/// - `state.json`: resume point, owned by the playback state store
/// - `movies/`: default media directory
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.vsmp`
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or(ConfigError::NoHomeDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn options_path(&self) -> PathBuf {
        self.dir.join(OPTIONS_FILE_NAME)
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    /// Loads the options, writing defaults if no options file exists.
    ///
    /// A relative media path is resolved against the configuration
    /// directory. Both the configuration and media directories are
    /// created when missing.
    pub fn load_options(&self) -> Result<Options, ConfigError> {
        create_dir(&self.dir)?;

        let path = self.options_path();
        let mut options = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str::<Options>(&json).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?
        } else {
            let defaults = Options::default();
            self.save_options(&defaults)?;
            log::info!("Wrote default options to {}", path.display());
            defaults
        };

        if options.path.is_relative() {
            options.path = self.dir.join(&options.path);
        }
        create_dir(&options.path)?;

        Ok(options)
    }

    pub fn save_options(&self, options: &Options) -> Result<(), ConfigError> {
        let path = self.options_path();
        let json = serde_json::to_string_pretty(options).map_err(|e| ConfigError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| ConfigError::Write { path, source: e })
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(path).map_err(|e| ConfigError::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}
