//! PMI variant: `srun` starts one containerized `hpl.sh` per task.

use super::{LaunchInputs, LaunchPlan, LaunchVariant};

/// `srun --mpi=<pmi> singularity run --nv -B <dat>:<dir> <container> hpl.sh ...`
pub fn build_pmi_plan(inputs: &LaunchInputs<'_>) -> LaunchPlan {
    let launch = &inputs.config.launch;
    let mut args = vec![
        format!("--mpi={}", launch.mpi.as_str()),
        launch.singularity.clone(),
        "run".into(),
        "--nv".into(),
        "-B".into(),
        inputs.dat_bind(),
        inputs.profile.container.clone(),
    ];
    args.extend(inputs.hpl_command());

    inputs.plan(LaunchVariant::Pmi, launch.srun.clone(), args)
}
