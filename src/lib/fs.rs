//! Filesystem side effects of a launch: base directory, launch script, parameter-file check.

use std::path::Path;

use crate::lib::errors::LaunchError;

/// Unix permission bits applied to generated launch scripts.
const LAUNCH_SCRIPT_PERMISSIONS: u32 = 0o755;

/// Create the base directory (and parents) if it does not exist yet.
pub async fn ensure_base_dir(path: &Path) -> Result<(), LaunchError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| LaunchError::CreateBaseDir {
            path: path.to_path_buf(),
            source,
        })
}

/// Write a launch script and mark it executable.
///
/// An existing file at `path` is overwritten.
pub async fn write_launch_script(path: &Path, body: &str) -> Result<(), LaunchError> {
    let wrap = |source| LaunchError::WriteScript {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::write(path, body.as_bytes()).await.map_err(wrap)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(
            path,
            std::fs::Permissions::from_mode(LAUNCH_SCRIPT_PERMISSIONS),
        )
        .await
        .map_err(wrap)?;
    }
    Ok(())
}

/// Fail when the selected HPL parameter file is absent on the host.
pub fn ensure_dat_file(path: &Path) -> Result<(), LaunchError> {
    if path.is_file() {
        return Ok(());
    }
    Err(LaunchError::MissingDatFile {
        path: path.to_path_buf(),
    })
}
