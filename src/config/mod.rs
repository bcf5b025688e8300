use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::metering_p1::Protocol;

const CONFIG_PATHS: [&str; 2] = ["config/p1meter.yaml", "p1meter.yaml"];

fn device_default() -> PathBuf { PathBuf::from("/dev/P1") }
fn protocol_default() -> Protocol { Protocol::Dsmr3 }
fn output_default() -> OutputFormat { OutputFormat::Json }

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Munin,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default="device_default")]
    pub device: PathBuf,
    #[serde(default="protocol_default")]
    pub protocol: Protocol,
    #[serde(default="output_default")]
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            device: device_default(),
            protocol: protocol_default(),
            output: output_default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Unable to parse config file {path}: {source}")]
    Parse { path: String, source: serde_yml::Error },
}

impl Config {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().display().to_string();
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|source| ConfigError::Read { path: path_str.clone(), source })?;
        let config: Config = serde_yml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path_str.clone(), source })?;
        info!("Loaded config from {}", path_str);
        Ok(config)
    }

    /// Checks config/p1meter.yaml and p1meter.yaml, defaults if neither exists
    pub fn load() -> Result<Self, ConfigError> {
        for path in CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::load_from(path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device: /dev/ttyUSB0\nprotocol: dsmr4\noutput: munin").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.device, PathBuf::from("/dev/ttyUSB0"));
        assert_eq!(config.protocol, Protocol::Dsmr4);
        assert_eq!(config.output, OutputFormat::Munin);
    }

    #[test]
    fn test_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "protocol: dsmr4").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.device, PathBuf::from("/dev/P1"));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_bad_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "protocol: dsmr9").unwrap();
        assert!(matches!(Config::load_from(file.path()), Err(ConfigError::Parse { .. })));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(Config::load_from(missing), Err(ConfigError::Read { .. })));
    }
}
