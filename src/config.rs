//! Settings read from a YAML file
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::io;
use std::fs::{create_dir_all, read_to_string, write};
use std::path::{Path, PathBuf};
use log::debug;
use serde::{Deserialize, Serialize};

/// Settings for the command line tool.
///
/// Every field may be left out of the file.
///
/// ```yaml
/// workers: 4
/// log_level: debug
/// log_file: /tmp/movegen.log
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Size of the worker pool; one per CPU when absent
    pub workers: Option<usize>,
    /// Log level used when logging is turned on
    pub log_level: String,
    /// File written when logging is turned on
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: None,
            log_level: "info".to_owned(),
            log_file: PathBuf::from("movegen.log"),
        }
    }
}

impl Config {
    /// Reads the settings at `path`
    pub fn load(path: &Path) -> Result<Config, Error> {
        let s = read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Writes the settings to `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let s = serde_yaml::to_string(self)?;
        if let Some(dir) = path.parent() {
            create_dir_all(dir)?;
        }
        write(path, s)?;
        Ok(())
    }

    /// Returns the default location, `$HOME/.movegen/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".movegen").join("config.yaml"))
    }

    /// Reads the settings at `path` if given, or else from the default location if a file exists
    /// there. Falls back to the defaults when neither applies.
    pub fn discover(path: Option<&Path>) -> Result<Config, Error> {
        if let Some(path) = path {
            return Config::load(path);
        }

        match Config::default_path() {
            Some(path) if path.is_file() => {
                debug!("reading settings from {}", path.display());
                Config::load(&path)
            },
            _ => Ok(Config::default()),
        }
    }
}

/// Error reading or writing a settings file
#[derive(Debug)]
pub enum Error {
    /// The file couldn't be read or written
    Io(io::Error),
    /// The file isn't valid YAML for `Config`
    Yaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(error) => write!(f, "config: {}", error),
            Error::Yaml(error) => write!(f, "config: {}", error),
        }
    }
}

impl std::error::Error for Error { }

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::Yaml(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn temp_file(name: &str) -> PathBuf {
        env::temp_dir().join(format!("movegen-{}-{}", process::id(), name))
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = serde_yaml::from_str("workers: 3\n").unwrap();
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_file, PathBuf::from("movegen.log"));
    }

    #[test]
    fn save_then_load() {
        let path = temp_file("config.yaml");
        let config = Config {
            workers: Some(2),
            log_level: "debug".to_owned(),
            ..Config::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_creates_the_directory() {
        let dir = temp_file("settings");
        let path = dir.join("config.yaml");
        Config::default().save(&path).unwrap();
        assert_eq!(Config::discover(Some(&path)).unwrap(), Config::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_path_must_exist() {
        let path = temp_file("missing.yaml");
        assert!(matches!(Config::discover(Some(&path)), Err(Error::Io(_))));
    }

    #[test]
    fn bad_yaml_is_reported() {
        let path = temp_file("bad.yaml");
        std::fs::write(&path, "workers: [1, 2\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Yaml(_))));
        let _ = std::fs::remove_file(&path);
    }
}
