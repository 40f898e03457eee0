//! The single hand-off to the external launcher.

use std::process::ExitStatus;

use tokio::process::Command;
use tracing::info;

use crate::lib::errors::LaunchError;

use super::LaunchPlan;

/// Exit code reported when the launcher ends without one (e.g. unknown platform status).
const FALLBACK_EXIT_CODE: i32 = 1;

/// Run the plan's program to completion and return its exit code.
///
/// Stdio is inherited. A launcher killed by a signal reports `128 + signal`,
/// matching what a shell would return.
pub async fn execute(plan: &LaunchPlan) -> Result<i32, LaunchError> {
    let mut command = Command::new(&plan.program);
    command
        .args(&plan.args)
        .envs(&plan.env)
        .current_dir(&plan.working_dir);

    info!(
        target: "hpl_launch::launch",
        variant = plan.variant.as_str(),
        command = %plan.command_line(),
        working_dir = %plan.working_dir.display(),
        "Handing off to external launcher"
    );

    let status = command
        .status()
        .await
        .map_err(|source| LaunchError::Spawn {
            program: plan.program.clone(),
            source,
        })?;
    Ok(exit_code_of(status))
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    FALLBACK_EXIT_CODE
}
