use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cue::DispatcherConfig;
use crate::osc::{Endpoint, EndpointError};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    device: DeviceConfig,
    #[serde(default)]
    dispatcher: DispatcherSection,
}

#[derive(Deserialize, Default)]
struct DeviceConfig {
    address: Option<String>,
    /// Wider than u16 so an out-of-range port reaches the validator
    port: Option<u32>,
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct DispatcherSection {
    max_simultaneous_jobs: Option<usize>,
    fade_step_interval_ms: Option<u64>,
    shutdown_timeout_ms: Option<u64>,
    queue_capacity: Option<usize>,
}

pub struct Config {
    device: DeviceConfig,
    dispatcher: DispatcherSection,
}

impl Config {
    /// Built-in defaults overlaid with the user's config file, if it exists
    /// and parses.
    pub fn load() -> Self {
        let mut base = embedded();

        if let Some(path) = user_config_path() {
            if path.exists() {
                match read_file(&path) {
                    Ok(user) => merge(&mut base, user),
                    Err(e) => log::warn!("Ignoring user config: {}", e),
                }
            }
        }

        Config {
            device: base.device,
            dispatcher: base.dispatcher,
        }
    }

    /// Built-in defaults overlaid with an explicit file. Errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut base = embedded();
        merge(&mut base, read_file(path)?);
        Ok(Config {
            device: base.device,
            dispatcher: base.dispatcher,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut base = embedded();
        merge(&mut base, toml::from_str(text)?);
        Ok(Config {
            device: base.device,
            dispatcher: base.dispatcher,
        })
    }

    /// The configured console, run through the endpoint validators
    pub fn endpoint(&self) -> Result<Endpoint, EndpointError> {
        let fallback = Endpoint::local();
        let address = self.device.address.as_deref().unwrap_or(fallback.address());
        let port = self
            .device
            .port
            .map(|p| p.to_string())
            .unwrap_or_else(|| fallback.port().to_string());
        let name = self.device.name.as_deref().unwrap_or(fallback.name());
        Endpoint::new(address, &port, name)
    }

    pub fn dispatcher(&self) -> DispatcherConfig {
        let fallback = DispatcherConfig::default();
        DispatcherConfig {
            max_simultaneous_jobs: self
                .dispatcher
                .max_simultaneous_jobs
                .unwrap_or(fallback.max_simultaneous_jobs),
            fade_step_interval: self
                .dispatcher
                .fade_step_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.fade_step_interval),
            shutdown_timeout: self
                .dispatcher
                .shutdown_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(fallback.shutdown_timeout),
            queue_capacity: self
                .dispatcher
                .queue_capacity
                .unwrap_or(fallback.queue_capacity),
        }
    }
}

fn embedded() -> ConfigFile {
    toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
        log::warn!("Built-in config.toml is invalid: {}", e);
        ConfigFile::default()
    })
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&contents)?)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mixcue").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    let device = user.device;
    if device.address.is_some() {
        base.device.address = device.address;
    }
    if device.port.is_some() {
        base.device.port = device.port;
    }
    if device.name.is_some() {
        base.device.name = device.name;
    }

    let dispatcher = user.dispatcher;
    if dispatcher.max_simultaneous_jobs.is_some() {
        base.dispatcher.max_simultaneous_jobs = dispatcher.max_simultaneous_jobs;
    }
    if dispatcher.fade_step_interval_ms.is_some() {
        base.dispatcher.fade_step_interval_ms = dispatcher.fade_step_interval_ms;
    }
    if dispatcher.shutdown_timeout_ms.is_some() {
        base.dispatcher.shutdown_timeout_ms = dispatcher.shutdown_timeout_ms;
    }
    if dispatcher.queue_capacity.is_some() {
        base.dispatcher.queue_capacity = dispatcher.queue_capacity;
    }
}
