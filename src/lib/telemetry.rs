//! Telemetry initialization and HPL launch span helpers.

use std::time::Instant;

use anyhow::Result;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr so stdout stays reserved for help text and dry-run plans.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record the hand-off to the external launcher.
pub struct LaunchSpan {
    span: Span,
    started_at: Instant,
    job_id: String,
}

impl LaunchSpan {
    /// Start a launch span.
    pub fn start(job_id: &str, variant: &'static str) -> Self {
        let span = info_span!(
            target: "hpl_launch::launch",
            "hpl_launch",
            job_id,
            variant
        );
        Self {
            span,
            started_at: Instant::now(),
            job_id: job_id.to_string(),
        }
    }

    /// Close the span while recording the launcher's exit code.
    pub fn finish(self, exit_code: i32) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "hpl_launch::launch",
            job_id = %self.job_id,
            exit_code,
            elapsed_ms = elapsed_ms as u64,
            "External launcher finished"
        );
    }
}

/// Payload describing a resolved launch, logged before the hand-off.
#[derive(Debug)]
pub struct LaunchTelemetry<'a> {
    pub variant: &'a str,
    pub nodes: u32,
    pub grid: &'a str,
    pub dat_file: &'a str,
    pub program: &'a str,
    pub container: &'a str,
    pub script_path: Option<&'a str>,
    pub dry_run: bool,
}

/// Emit the resolved launch to `tracing`.
pub fn emit_launch_plan(telemetry: &LaunchTelemetry<'_>) {
    info!(
        target: "hpl_launch::launch",
        variant = telemetry.variant,
        nodes = telemetry.nodes,
        grid = telemetry.grid,
        dat_file = telemetry.dat_file,
        program = telemetry.program,
        container = telemetry.container,
        script_path = telemetry.script_path.unwrap_or(""),
        dry_run = telemetry.dry_run,
        "Resolved HPL launch"
    );
}
