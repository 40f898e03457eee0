use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::{Mutex, MutexGuard},
};

use tempfile::TempDir;

pub const PMI_BINARY: &str = env!("CARGO_BIN_EXE_run-hpl-pmi");
pub const ORTE_BINARY: &str = env!("CARGO_BIN_EXE_run-hpl-orte");

/// Serializes tests that write and exec fake launchers (avoids ETXTBSY races).
static LAUNCH_LOCK: Mutex<()> = Mutex::new(());

pub fn launch_lock() -> MutexGuard<'static, ()> {
    LAUNCH_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scratch area holding a fake home, fake launchers, and their call logs.
pub struct Sandbox {
    pub temp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("can create temporary directory");
        fs::create_dir_all(temp.path().join("home")).expect("can create fake home");
        Self { temp }
    }

    pub fn home(&self) -> PathBuf {
        self.temp.path().join("home")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Write a launcher stand-in that logs its arguments one per line and
    /// exits with `FAKE_LAUNCHER_EXIT` (default 0).
    pub fn fake_launcher(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        let log = self.log_path(name);
        let body = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nprintf 'cwd=%s\\nGPU_AFFINITY=%s\\n' \"$(pwd)\" \"$GPU_AFFINITY\" >> '{}'\nexit \"${{FAKE_LAUNCHER_EXIT:-0}}\"\n",
            log.display(),
            log.display()
        );
        fs::write(&path, body).expect("can write fake launcher");
        make_executable(&path);
        path
    }

    pub fn log_path(&self, name: &str) -> PathBuf {
        self.path(&format!("{name}.log"))
    }

    pub fn read_log(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.log_path(name))
            .unwrap_or_else(|_| panic!("{name} was not invoked"))
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Write a launcher config pointing every program at fake launchers.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let srun = self.fake_launcher("srun");
        let singularity = self.fake_launcher("singularity");
        let path = self.path("launcher.toml");
        let body = format!(
            "[launch]\nsrun = \"{}\"\nsingularity = \"{}\"\n{extra}",
            srun.display(),
            singularity.display()
        );
        fs::write(&path, body).expect("can write launcher config");
        path
    }

    /// A command with a clean environment: fake `HOME`, the given Slurm
    /// variables, and `HPL_LAUNCH_CONFIG` when a config was written.
    pub fn command(&self, binary: &str, slurm: &[(&str, &str)]) -> Command {
        let mut command = Command::new(binary);
        command.env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }
        command.env("HOME", self.home());
        command.env("RUST_LOG", "warn");
        let config = self.path("launcher.toml");
        if config.exists() {
            command.env("HPL_LAUNCH_CONFIG", config);
        }
        for (key, value) in slurm {
            command.env(key, value);
        }
        command
    }
}

pub fn run(mut command: Command) -> Output {
    command.output().expect("launcher binary should start")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn make_executable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .expect("can mark fake launcher executable");
    }
}
