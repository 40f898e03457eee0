//! Load and validate the optional launcher configuration.
use std::{ffi::OsString, path::PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod hpl;
pub mod launch;
pub mod telemetry;

pub use hpl::{parse_hpl_section, HplSection, RawHplSection};
pub use launch::{
    parse_launch_section, LaunchSection, PmiFlavor, RawLaunchSection, DEFAULT_CONTAINER_DAT_DIR,
    DEFAULT_MPIRUN, DEFAULT_SINGULARITY, DEFAULT_SRUN,
};

pub const CONFIG_ENV_KEY: &str = "HPL_LAUNCH_CONFIG";

/// Top-level configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    pub launch: LaunchSection,
    pub hpl: HplSection,
    /// `None` when the built-in defaults are in use.
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawLauncherConfig {
    launch: Option<RawLaunchSection>,
    hpl: Option<RawHplSection>,
}

impl LauncherConfig {
    /// Load `HPL_LAUNCH_CONFIG` if set; otherwise use the built-in defaults.
    pub fn load_from_env_or_default() -> Result<Self, ConfigError> {
        Self::load_from_env_value(std::env::var_os(CONFIG_ENV_KEY))
    }

    /// Same as [`Self::load_from_env_or_default`] with the variable's value supplied.
    pub fn load_from_env_value(value: Option<OsString>) -> Result<Self, ConfigError> {
        match value.filter(|value| !value.is_empty()) {
            Some(value) => {
                let path = PathBuf::from(value);
                telemetry::log_env_source(&path);
                Self::load_from_path(path)
            }
            None => {
                telemetry::log_defaults();
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "hpl_launch::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(
            config::File::from(path.clone()).format(config::FileFormat::Toml),
        );
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "hpl_launch::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawLauncherConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "hpl_launch::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "hpl_launch::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawLauncherConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let launch = parse_launch_section(raw.launch, &path)?;
        let hpl = parse_hpl_section(raw.hpl);

        Ok(Self {
            launch,
            hpl,
            source_path: Some(path),
        })
    }
}
