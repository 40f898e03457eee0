//! Launch plans: the fully resolved external invocation for each variant.
use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    cli::LaunchProfile,
    config::LauncherConfig,
    hpl::{
        affinity::AffinityProfile,
        hostlist::build_host_list,
        topology::{select_topology, Topology},
    },
    lib::{errors::LaunchError, fs as launch_fs, paths, shell, slurm::SlurmEnv},
};

pub mod executor;
pub mod orte;
pub mod pmi;

/// Entry script inside the HPL container.
pub const HPL_ENTRYPOINT: &str = "hpl.sh";
/// Prefix Singularity strips when injecting host variables into the container.
pub const CONTAINER_ENV_PREFIX: &str = "SINGULARITYENV_";

/// Cross-node launch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchVariant {
    /// `srun --mpi=<pmi>` wrapping the container.
    Pmi,
    /// `mpirun` inside the container, reaching other nodes over ssh.
    Orte,
}

impl LaunchVariant {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LaunchVariant::Pmi => "pmi",
            LaunchVariant::Orte => "orte",
        }
    }
}

/// Intermediate script materialized by the ORTE variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchScript {
    pub path: PathBuf,
    pub body: String,
}

/// Everything needed to hand off to the external launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub variant: LaunchVariant,
    pub nodes: u32,
    pub grid: String,
    pub dat_file: String,
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<LaunchScript>,
}

impl LaunchPlan {
    /// Shell-quoted command line, for logs and dry runs.
    pub fn command_line(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell::join(&words)
    }
}

/// Inputs shared by both command builders.
#[derive(Debug, Clone, Copy)]
pub struct LaunchInputs<'a> {
    pub profile: &'a LaunchProfile,
    pub config: &'a LauncherConfig,
    pub affinity: &'a AffinityProfile,
    pub topology: &'a Topology,
}

impl LaunchInputs<'_> {
    pub fn dat_file_name(&self) -> String {
        self.topology.dat_file_name(self.affinity)
    }

    /// `-B` bind of the host data directory to its in-container location.
    pub fn dat_bind(&self) -> String {
        format!(
            "{}:{}",
            self.profile.hpldatdir.display(),
            self.config.launch.container_dat_dir
        )
    }

    /// `hpl.sh` and its flags, ending with the in-container parameter file.
    pub fn hpl_command(&self) -> Vec<String> {
        let mut command = vec![HPL_ENTRYPOINT.to_string()];
        command.extend(self.affinity.hpl_args());
        command.push("--dat".into());
        command.push(paths::join_container_path(
            &self.config.launch.container_dat_dir,
            &self.dat_file_name(),
        ));
        command
    }

    /// Variables exported to the launcher and, prefixed, into the container.
    pub fn launch_env(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        let affinity = self
            .affinity
            .env_vars()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value));
        let extra = self
            .config
            .launch
            .env
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()));
        for (key, value) in affinity.chain(extra) {
            env.insert(format!("{CONTAINER_ENV_PREFIX}{key}"), value.clone());
            env.insert(key, value);
        }
        env
    }

    fn plan(&self, variant: LaunchVariant, program: String, args: Vec<String>) -> LaunchPlan {
        LaunchPlan {
            variant,
            nodes: self.topology.nodes,
            grid: self.topology.grid.to_string(),
            dat_file: self.dat_file_name(),
            program,
            args,
            env: self.launch_env(),
            working_dir: self.profile.basedir.clone(),
            script: None,
        }
    }
}

/// Whether this task should orchestrate the launch at all.
///
/// The ORTE variant runs on every task of the batch step but only rank 0
/// starts `mpirun`; the PMI variant always proceeds.
pub fn should_orchestrate(variant: LaunchVariant, slurm: &SlurmEnv) -> Result<bool, LaunchError> {
    match variant {
        LaunchVariant::Pmi => Ok(true),
        LaunchVariant::Orte => Ok(slurm.rank()? == 0),
    }
}

/// Resolve topology and build the launch plan for one variant.
///
/// Pure apart from the optional parameter-file existence check.
pub fn plan_launch(
    variant: LaunchVariant,
    profile: &LaunchProfile,
    config: &LauncherConfig,
    affinity: &AffinityProfile,
    slurm: &SlurmEnv,
    generated_at: DateTime<Utc>,
) -> Result<LaunchPlan, LaunchError> {
    let nodes = slurm.node_count()?;
    let topology = select_topology(nodes)?;
    let inputs = LaunchInputs {
        profile,
        config,
        affinity,
        topology,
    };

    if config.hpl.verify_dat_file {
        launch_fs::ensure_dat_file(&profile.hpldatdir.join(inputs.dat_file_name()))?;
    }

    match variant {
        LaunchVariant::Pmi => Ok(pmi::build_pmi_plan(&inputs)),
        LaunchVariant::Orte => {
            let job_id = slurm.job_id()?;
            let hosts = slurm.hostnames()?;
            let slots = slurm
                .tasks_per_node()?
                .unwrap_or(affinity.ranks_per_node);
            let host_list = build_host_list(&hosts, slots);
            Ok(orte::build_orte_plan(
                &inputs,
                &host_list,
                job_id,
                generated_at,
            ))
        }
    }
}
