//! Entry point for the ORTE (`mpirun` inside the container) HPL launcher.
use std::process::ExitCode;

use hpl_launch::{hpl::LaunchVariant, runtime};

#[tokio::main]
async fn main() -> ExitCode {
    match runtime::run_launcher(LaunchVariant::Orte).await {
        Ok(code) => code,
        Err(exit) => exit.report(),
    }
}
