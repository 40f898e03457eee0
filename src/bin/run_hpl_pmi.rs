//! Entry point for the PMI (`srun`) HPL launcher.
use std::process::ExitCode;

use hpl_launch::{hpl::LaunchVariant, runtime};

#[tokio::main]
async fn main() -> ExitCode {
    match runtime::run_launcher(LaunchVariant::Pmi).await {
        Ok(code) => code,
        Err(exit) => exit.report(),
    }
}
