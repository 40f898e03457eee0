use std::process::ExitCode;

use anyhow::Error;
use chrono::Utc;
use tracing::{error, info};

use crate::{
    cli::{LaunchArgs, LaunchProfile, ParsedCommand},
    config::LauncherConfig,
    hpl::{
        affinity::DGX_A100_40GB,
        launch::{executor, plan_launch, should_orchestrate, LaunchPlan, LaunchVariant},
    },
    lib::{
        errors::LaunchError,
        fs as launch_fs,
        slurm::SlurmEnv,
        telemetry::{self, LaunchSpan, LaunchTelemetry},
    },
};

/// Bundles a runtime error message with an exit code.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: u8,
}

impl RuntimeExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:#}"),
            exit_code: 1,
        }
    }

    /// Print the message to stderr and return the process exit code.
    pub fn report(self) -> ExitCode {
        eprintln!("ERROR: {}", self.message);
        ExitCode::from(self.exit_code)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<LaunchError> for RuntimeExit {
    fn from(err: LaunchError) -> Self {
        Self::from_error(err)
    }
}

/// Parse arguments, resolve the launch, and hand off to the external launcher.
///
/// Returns the exit code to use on success paths (help, dry run, idle rank, or
/// the launcher's own status).
pub async fn run_launcher(variant: LaunchVariant) -> Result<ExitCode, RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;

    // Non-zero ORTE ranks leave before argument parsing so only rank 0 reports.
    let slurm = SlurmEnv::from_process_env();
    if !should_orchestrate(variant, &slurm)? {
        info!(
            target: "hpl_launch::launch",
            variant = variant.as_str(),
            procid = slurm.procid.as_deref().unwrap_or(""),
            "Not rank 0; leaving the launch to rank 0"
        );
        return Ok(ExitCode::SUCCESS);
    }

    let args = match LaunchArgs::parse_command() {
        ParsedCommand::Launch(args) => args,
        ParsedCommand::Help(text) => {
            print!("{text}");
            return Ok(ExitCode::SUCCESS);
        }
        ParsedCommand::Rejected(text) => {
            eprint!("{text}");
            return Ok(ExitCode::from(1));
        }
    };

    let profile = args.build().map_err(RuntimeExit::from_error)?;
    let config = LauncherConfig::load_from_env_or_default().map_err(RuntimeExit::from_error)?;
    info!(
        target: "hpl_launch::cli",
        basedir = %profile.basedir.display(),
        container = %profile.container,
        hpldatdir = %profile.hpldatdir.display(),
        dry_run = profile.dry_run,
        "Resolved launch options"
    );

    let plan = plan_launch(
        variant,
        &profile,
        &config,
        &DGX_A100_40GB,
        &slurm,
        Utc::now(),
    )
    .map_err(|err| {
        error!(
            target: "hpl_launch::topology",
            variant = variant.as_str(),
            nodes = slurm.num_nodes.as_deref().unwrap_or(""),
            reason = %err,
            "Could not resolve HPL launch"
        );
        RuntimeExit::from(err)
    })?;
    emit_plan(&plan, &profile);

    if profile.dry_run {
        let rendered = serde_json::to_string_pretty(&plan).map_err(RuntimeExit::from_error)?;
        println!("{rendered}");
        return Ok(ExitCode::SUCCESS);
    }

    hand_off(&plan, &profile, &slurm).await
}

async fn hand_off(
    plan: &LaunchPlan,
    profile: &LaunchProfile,
    slurm: &SlurmEnv,
) -> Result<ExitCode, RuntimeExit> {
    launch_fs::ensure_base_dir(&profile.basedir).await?;
    if let Some(script) = &plan.script {
        launch_fs::write_launch_script(&script.path, &script.body).await?;
        info!(
            target: "hpl_launch::launch",
            path = %script.path.display(),
            "Wrote launch script"
        );
    }

    let span = LaunchSpan::start(
        slurm.job_id.as_deref().unwrap_or("unknown"),
        plan.variant.as_str(),
    );
    let code = executor::execute(plan).await?;
    span.finish(code);

    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

fn emit_plan(plan: &LaunchPlan, profile: &LaunchProfile) {
    let script_path = plan
        .script
        .as_ref()
        .map(|script| script.path.display().to_string());
    telemetry::emit_launch_plan(&LaunchTelemetry {
        variant: plan.variant.as_str(),
        nodes: plan.nodes,
        grid: &plan.grid,
        dat_file: &plan.dat_file,
        program: &plan.program,
        container: &profile.container,
        script_path: script_path.as_deref(),
        dry_run: profile.dry_run,
    });
}
