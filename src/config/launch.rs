use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_SRUN: &str = "srun";
pub const DEFAULT_SINGULARITY: &str = "singularity";
pub const DEFAULT_MPIRUN: &str = "mpirun";
pub const DEFAULT_CONTAINER_DAT_DIR: &str = "/my-dat-files";

/// PMI flavour passed to `srun --mpi=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PmiFlavor {
    Pmi,
    #[default]
    Pmi2,
    Pmix,
}

impl PmiFlavor {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PmiFlavor::Pmi => "pmi",
            PmiFlavor::Pmi2 => "pmi2",
            PmiFlavor::Pmix => "pmix",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pmi" => Some(PmiFlavor::Pmi),
            "pmi2" => Some(PmiFlavor::Pmi2),
            "pmix" => Some(PmiFlavor::Pmix),
            _ => None,
        }
    }
}

/// External programs and container wiring used to build the launch command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSection {
    pub srun: String,
    pub mpi: PmiFlavor,
    pub singularity: String,
    pub mpirun: String,
    pub container_dat_dir: String,
    pub env: BTreeMap<String, String>,
}

impl Default for LaunchSection {
    fn default() -> Self {
        Self {
            srun: DEFAULT_SRUN.to_string(),
            mpi: PmiFlavor::default(),
            singularity: DEFAULT_SINGULARITY.to_string(),
            mpirun: DEFAULT_MPIRUN.to_string(),
            container_dat_dir: DEFAULT_CONTAINER_DAT_DIR.to_string(),
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLaunchSection {
    pub srun: Option<String>,
    pub mpi: Option<String>,
    pub singularity: Option<String>,
    pub mpirun: Option<String>,
    pub container_dat_dir: Option<String>,
    /// `KEY=VALUE` entries forwarded to the launcher and into the container.
    pub env: Option<Vec<String>>,
}

pub fn parse_launch_section(
    raw: Option<RawLaunchSection>,
    path: &Path,
) -> Result<LaunchSection, ConfigError> {
    let raw = raw.unwrap_or_default();

    let srun = raw.srun.unwrap_or_else(|| DEFAULT_SRUN.to_string());
    validate_program(path, "launch.srun", &srun)?;
    let singularity = raw
        .singularity
        .unwrap_or_else(|| DEFAULT_SINGULARITY.to_string());
    validate_program(path, "launch.singularity", &singularity)?;
    let mpirun = raw.mpirun.unwrap_or_else(|| DEFAULT_MPIRUN.to_string());
    validate_program(path, "launch.mpirun", &mpirun)?;

    let mpi = match raw.mpi {
        None => PmiFlavor::default(),
        Some(value) => PmiFlavor::parse(&value).ok_or_else(|| ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "launch.mpi",
            message: format!("Use one of pmi, pmi2, pmix (got `{value}`)"),
        })?,
    };

    let container_dat_dir = raw
        .container_dat_dir
        .unwrap_or_else(|| DEFAULT_CONTAINER_DAT_DIR.to_string());
    validate_container_dir(path, &container_dat_dir)?;

    let env = parse_env(path, raw.env.unwrap_or_default())?;

    Ok(LaunchSection {
        srun,
        mpi,
        singularity,
        mpirun,
        container_dat_dir,
        env,
    })
}

fn validate_program(path: &Path, field: &'static str, program: &str) -> Result<(), ConfigError> {
    if program.trim().is_empty() || program.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Provide a program name or path without whitespace".into(),
        });
    }
    Ok(())
}

fn validate_container_dir(path: &Path, dir: &str) -> Result<(), ConfigError> {
    if !dir.starts_with('/') || dir.contains(':') {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "launch.container_dat_dir",
            message: format!("Provide an absolute in-container path without `:` (got `{dir}`)"),
        });
    }
    Ok(())
}

fn parse_env(path: &Path, entries: Vec<String>) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut env = BTreeMap::new();
    for entry in entries {
        let invalid = |message: String| ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "launch.env",
            message,
        };
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| invalid(format!("`{entry}` is not a KEY=VALUE entry")))?;
        let mut chars = key.chars();
        let valid = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(invalid(format!(
                "`{key}` is not a valid environment variable name"
            )));
        }
        env.insert(key.to_string(), value.to_string());
    }
    Ok(env)
}
