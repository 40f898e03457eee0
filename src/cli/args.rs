//! CLI argument definitions and `LaunchProfile` construction.
use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};

use super::{resolve_profile, LaunchProfile};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    Launch(LaunchArgs),
    /// `-h/--help`: print to stdout and exit 0.
    Help(String),
    /// Unknown option or bad value: print to stderr and exit 1.
    Rejected(String),
}

/// Command-line arguments shared by both launchers.
#[derive(Debug, Clone, Parser)]
#[command(
    about = "Launch the containerized HPL benchmark across a Slurm allocation",
    long_about = None,
    after_help = "The node count comes from SLURM_JOB_NUM_NODES; supported allocations are 1, 2, 4 and 8 nodes.\nSet HPL_LAUNCH_CONFIG to a TOML file to override launcher programs."
)]
pub struct LaunchArgs {
    /// Base directory for launch artifacts (default: $HOME/hpl).
    #[arg(long, value_name = "PATH")]
    pub basedir: Option<PathBuf>,
    /// Container image to run (default: <basedir>/hpc-benchmarks_20.10-hpl.sif).
    #[arg(long, value_name = "PATH")]
    pub container: Option<String>,
    /// Directory holding the HPL parameter files (default: <basedir>/hpl-dat).
    #[arg(long, value_name = "PATH")]
    pub hpldatdir: Option<PathBuf>,
    /// Print the resolved launch plan as JSON instead of launching.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl LaunchArgs {
    /// Parse process arguments into a launch request, help text, or rejection.
    pub fn parse_command() -> ParsedCommand {
        Self::parse_command_from(env::args_os())
    }

    pub fn parse_command_from<I, T>(args: I) -> ParsedCommand
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(args) => ParsedCommand::Launch(args),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    ParsedCommand::Help(err.render().to_string())
                }
                _ => ParsedCommand::Rejected(err.render().to_string()),
            },
        }
    }

    /// Build a `LaunchProfile` from CLI args, `HOME`, and the current directory.
    pub fn build(self) -> Result<LaunchProfile> {
        let cwd = env::current_dir().context("failed to read the current directory")?;
        self.build_with(env::var_os("HOME"), &cwd)
    }

    pub fn build_with(self, home: Option<OsString>, cwd: &Path) -> Result<LaunchProfile> {
        resolve_profile(
            self.basedir,
            self.container,
            self.hpldatdir,
            self.dry_run,
            home,
            cwd,
        )
    }
}
