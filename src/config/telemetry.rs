use tracing::{debug, info};

use super::{LauncherConfig, CONFIG_ENV_KEY};

pub fn log_env_source(path: &std::path::Path) {
    info!(
        target: "hpl_launch::config",
        path = %path.display(),
        "Loading launcher configuration using HPL_LAUNCH_CONFIG environment variable"
    );
}

pub fn log_defaults() {
    debug!(
        target: "hpl_launch::config",
        env = CONFIG_ENV_KEY,
        "HPL_LAUNCH_CONFIG not set; using built-in launcher defaults"
    );
}

pub fn log_loaded(config: &LauncherConfig) {
    info!(
        target: "hpl_launch::config",
        path = %config
            .source_path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_default(),
        srun = %config.launch.srun,
        mpi = config.launch.mpi.as_str(),
        singularity = %config.launch.singularity,
        mpirun = %config.launch.mpirun,
        extra_env = config.launch.env.len(),
        verify_dat_file = config.hpl.verify_dat_file,
        "Launcher configuration loaded successfully"
    );
}
