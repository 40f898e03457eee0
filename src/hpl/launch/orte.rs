//! ORTE variant: rank 0 writes a launch script and runs it inside the container.
//!
//! `mpirun` in the container starts remote ranks over ssh, so passwordless ssh
//! between the allocated nodes is a precondition that is not checked here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::lib::shell;

use super::{LaunchInputs, LaunchPlan, LaunchScript, LaunchVariant, CONTAINER_ENV_PREFIX};

/// `<basedir>/runhpl-<jobid>.sh`; the job id keeps concurrent jobs apart.
pub fn script_path(basedir: &Path, job_id: &str) -> PathBuf {
    basedir.join(format!("runhpl-{job_id}.sh"))
}

/// Body of the intermediate script: one `mpirun` over the whole host list.
pub fn render_script(
    inputs: &LaunchInputs<'_>,
    host_list: &str,
    job_id: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut words = vec![
        inputs.config.launch.mpirun.clone(),
        "-np".to_string(),
        inputs.topology.grid.ranks().to_string(),
        "--host".to_string(),
        host_list.to_string(),
        "--bind-to".to_string(),
        "none".to_string(),
    ];
    for key in inputs.launch_env().into_keys() {
        if key.starts_with(CONTAINER_ENV_PREFIX) {
            continue;
        }
        words.push("-x".to_string());
        words.push(key);
    }
    words.extend(inputs.hpl_command());

    format!(
        "#!/bin/bash\n\
         # HPL launch script for Slurm job {job_id} ({nodes} nodes, grid {grid})\n\
         # Generated {stamp}\n\
         {command}\n",
        nodes = inputs.topology.nodes,
        grid = inputs.topology.grid,
        stamp = generated_at.format("%Y-%m-%dT%H:%M:%SZ"),
        command = shell::join(&words),
    )
}

/// `singularity exec --nv -B <basedir> -B <dat>:<dir> <container> <script>`
pub fn build_orte_plan(
    inputs: &LaunchInputs<'_>,
    host_list: &str,
    job_id: &str,
    generated_at: DateTime<Utc>,
) -> LaunchPlan {
    let basedir = &inputs.profile.basedir;
    let path = script_path(basedir, job_id);
    let body = render_script(inputs, host_list, job_id, generated_at);

    let args = vec![
        "exec".to_string(),
        "--nv".to_string(),
        "-B".to_string(),
        basedir.display().to_string(),
        "-B".to_string(),
        inputs.dat_bind(),
        inputs.profile.container.clone(),
        path.display().to_string(),
    ];

    let mut plan = inputs.plan(
        LaunchVariant::Orte,
        inputs.config.launch.singularity.clone(),
        args,
    );
    plan.script = Some(LaunchScript { path, body });
    plan
}
