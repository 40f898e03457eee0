use crate::common::{launch_lock, run, stderr, Sandbox, PMI_BINARY};

#[test]
fn supported_node_counts_launch_matching_parameter_file() {
    let _guard = launch_lock();
    for (nodes, grid) in [("1", "4x2"), ("2", "4x4"), ("4", "8x4"), ("8", "8x8")] {
        let sandbox = Sandbox::new();
        let singularity = sandbox.path("singularity");
        sandbox.write_config("");

        let output = run(sandbox.command(
            PMI_BINARY,
            &[("SLURM_JOB_NUM_NODES", nodes), ("SLURM_JOB_ID", "100")],
        ));
        assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

        let log = sandbox.read_log("srun");
        assert_eq!(log[0], "--mpi=pmi2");
        assert_eq!(log[1], singularity.display().to_string());
        assert_eq!(&log[2..4], ["run", "--nv"]);
        assert!(log.contains(&"hpl.sh".to_string()));
        assert!(
            log.contains(&format!("/my-dat-files/HPL.dat_{grid}_dgx_a100_40GB")),
            "nodes={nodes}: {log:?}"
        );
        let base = sandbox.home().join("hpl");
        assert!(base.is_dir(), "base directory should be created");
        assert!(
            log.iter().any(|line| line.starts_with("cwd=") && line.ends_with("/home/hpl")),
            "{log:?}"
        );
        assert!(log.contains(&"GPU_AFFINITY=0:1:2:3:4:5:6:7".to_string()));
    }
}

#[test]
fn unsupported_node_count_never_invokes_launcher() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let output = run(sandbox.command(PMI_BINARY, &[("SLURM_JOB_NUM_NODES", "3")]));

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("ERROR: unsupported node count 3"),
        "{}",
        stderr(&output)
    );
    assert!(!sandbox.log_path("srun").exists());
}

#[test]
fn missing_node_count_is_an_error() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let output = run(sandbox.command(PMI_BINARY, &[]));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("SLURM_JOB_NUM_NODES"));
    assert!(!sandbox.log_path("srun").exists());
}

#[test]
fn launcher_exit_status_is_propagated() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let mut command = sandbox.command(PMI_BINARY, &[("SLURM_JOB_NUM_NODES", "1")]);
    command.env("FAKE_LAUNCHER_EXIT", "3");
    let output = run(command);

    assert_eq!(output.status.code(), Some(3));
    assert!(sandbox.log_path("srun").exists());
}

#[test]
fn container_override_reaches_the_command() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("mpi = \"pmix\"\n");

    let mut command = sandbox.command(PMI_BINARY, &[("SLURM_JOB_NUM_NODES", "2")]);
    command
        .arg("--container")
        .arg("docker://nvcr.io/nvidia/hpc-benchmarks:20.10-hpl");
    let output = run(command);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let log = sandbox.read_log("srun");
    assert_eq!(log[0], "--mpi=pmix");
    assert_eq!(log[6], "docker://nvcr.io/nvidia/hpc-benchmarks:20.10-hpl");
}

#[test]
fn dat_file_verification_fails_before_launch() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("[hpl]\nverify_dat_file = true\n");

    let output = run(sandbox.command(PMI_BINARY, &[("SLURM_JOB_NUM_NODES", "1")]));

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("HPL.dat_4x2_dgx_a100_40GB"),
        "{}",
        stderr(&output)
    );
    assert!(!sandbox.log_path("srun").exists());
}

#[test]
fn relative_basedir_binds_an_absolute_dat_dir() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");
    std::fs::create_dir_all(sandbox.path("rel/hpl-dat")).expect("create dat dir");

    let mut command = sandbox.command(PMI_BINARY, &[("SLURM_JOB_NUM_NODES", "1")]);
    command.current_dir(sandbox.temp.path()).arg("--basedir").arg("rel");
    let output = run(command);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let log = sandbox.read_log("srun");
    let bind = log[5]
        .strip_suffix(":/my-dat-files")
        .unwrap_or_else(|| panic!("unexpected bind argument: {log:?}"));
    let bind = std::path::Path::new(bind);
    assert!(bind.is_absolute(), "{log:?}");
    assert!(bind.is_dir(), "bound directory {} does not exist", bind.display());
    assert!(std::path::Path::new(&log[6]).is_absolute(), "{log:?}");
}
