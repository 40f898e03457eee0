//! LaunchProfile and default path resolution.
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Result};

const DEFAULT_BASEDIR_NAME: &str = "hpl";
const DEFAULT_CONTAINER_NAME: &str = "hpc-benchmarks_20.10-hpl.sif";
const DEFAULT_DAT_DIR_NAME: &str = "hpl-dat";

/// Resolved launch paths, consumed once by the command builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchProfile {
    pub basedir: PathBuf,
    /// Image path or URI, passed to the container runtime verbatim.
    pub container: String,
    pub hpldatdir: PathBuf,
    pub dry_run: bool,
}

/// Resolve every path: CLI override first, then the `$HOME/hpl` convention.
///
/// Relative host paths are anchored at `cwd`, since the launcher later runs
/// inside `basedir`. A container URI (`docker://...`) is kept verbatim.
pub fn resolve_profile(
    basedir: Option<PathBuf>,
    container: Option<String>,
    hpldatdir: Option<PathBuf>,
    dry_run: bool,
    home: Option<OsString>,
    cwd: &Path,
) -> Result<LaunchProfile> {
    let basedir = require_utf8("--basedir", cwd.join(resolve_basedir(basedir, home)?))?;
    let hpldatdir = match hpldatdir {
        Some(path) => cwd.join(path),
        None => basedir.join(DEFAULT_DAT_DIR_NAME),
    };
    let hpldatdir = require_utf8("--hpldatdir", hpldatdir)?;
    let container = match container {
        Some(container) if is_uri(&container) => container,
        Some(container) => require_utf8("--container", cwd.join(container))?
            .display()
            .to_string(),
        None => basedir.join(DEFAULT_CONTAINER_NAME).display().to_string(),
    };

    Ok(LaunchProfile {
        basedir,
        container,
        hpldatdir,
        dry_run,
    })
}

/// Resolve base directory in the order: CLI override → `$HOME/hpl`.
fn resolve_basedir(override_path: Option<PathBuf>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }
    home.filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(DEFAULT_BASEDIR_NAME))
        .ok_or_else(|| anyhow!("HOME is unset; pass --basedir explicitly"))
}

fn is_uri(container: &str) -> bool {
    container.contains("://")
}

/// Paths end up in argv as strings; a lossy conversion would name another file.
fn require_utf8(flag: &str, path: PathBuf) -> Result<PathBuf> {
    if path.to_str().is_none() {
        bail!("{flag} path {} is not valid UTF-8", path.display());
    }
    Ok(path)
}
