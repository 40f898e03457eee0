use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating the launcher configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Problems with the Slurm-provided job environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerEnvError {
    #[error("{var} is not set; run this launcher inside a Slurm allocation")]
    Missing { var: &'static str },
    #[error("{var} has an invalid value `{value}`")]
    Invalid { var: &'static str, value: String },
}

/// Failures while expanding a Slurm compact host list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostListError {
    #[error("host list is empty")]
    Empty,
    #[error("unbalanced brackets in host list `{list}`")]
    UnbalancedBrackets { list: String },
    #[error("invalid range `{range}` in host list `{list}`")]
    InvalidRange { list: String, range: String },
}

/// Node counts that have no precomputed HPL parameter file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("unsupported node count {nodes}; supported: {supported}")]
    UnsupportedNodeCount { nodes: u32, supported: String },
}

/// High-level failure types returned while preparing or handing off an HPL launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerEnvError),
    #[error(transparent)]
    HostList(#[from] HostListError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("HPL parameter file {path} does not exist")]
    MissingDatFile { path: PathBuf },
    #[error("Failed to create base directory {path}: {source}")]
    CreateBaseDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write launch script {path}: {source}")]
    WriteScript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}
