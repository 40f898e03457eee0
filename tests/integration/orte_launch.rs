use std::{fs, path::Path};

use serde_json::Value;

use crate::common::{launch_lock, run, stderr, stdout, Sandbox, ORTE_BINARY};

fn rank0_env<'a>(nodes: &'a str, nodelist: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("SLURM_JOB_NUM_NODES", nodes),
        ("SLURM_JOB_NODELIST", nodelist),
        ("SLURM_NTASKS_PER_NODE", "8"),
        ("SLURM_JOB_ID", "4242"),
        ("SLURM_PROCID", "0"),
    ]
}

#[test]
fn rank_zero_writes_script_and_runs_container() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let output = run(sandbox.command(ORTE_BINARY, &rank0_env("2", "a,b")));
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let base = sandbox.home().join("hpl");
    let script = base.join("runhpl-4242.sh");
    let body = fs::read_to_string(&script).expect("launch script written");
    assert!(body.starts_with("#!/bin/bash\n"));
    assert!(body.contains("mpirun -np 16 --host a:8,b:8 --bind-to none"), "{body}");
    assert!(body.contains("--dat /my-dat-files/HPL.dat_4x4_dgx_a100_40GB"));
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&script).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o111, 0o111, "script must be executable");
    }

    let log = sandbox.read_log("singularity");
    assert_eq!(&log[0..3], ["exec", "--nv", "-B"]);
    assert_eq!(log[3], base.display().to_string());
    assert_eq!(
        log[5],
        format!("{}:/my-dat-files", base.join("hpl-dat").display())
    );
    assert_eq!(
        log[6],
        base.join("hpc-benchmarks_20.10-hpl.sif").display().to_string()
    );
    assert_eq!(log[7], script.display().to_string());
    assert!(!sandbox.log_path("srun").exists());
}

#[test]
fn non_zero_rank_exits_without_side_effects() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let mut env = rank0_env("2", "a,b");
    env.retain(|(key, _)| *key != "SLURM_PROCID");
    env.push(("SLURM_PROCID", "1"));
    let output = run(sandbox.command(ORTE_BINARY, &env));

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(!sandbox.home().join("hpl").exists());
    assert!(!sandbox.log_path("singularity").exists());
}

#[test]
fn non_zero_rank_ignores_unsupported_node_count() {
    let sandbox = Sandbox::new();
    let output = run(sandbox.command(
        ORTE_BINARY,
        &[("SLURM_JOB_NUM_NODES", "3"), ("SLURM_PROCID", "5")],
    ));
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn compact_nodelist_is_expanded() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let output = run(sandbox.command(ORTE_BINARY, &rank0_env("2", "dgx[07-08]")));
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let body = fs::read_to_string(sandbox.home().join("hpl").join("runhpl-4242.sh"))
        .expect("launch script written");
    assert!(body.contains("--host dgx07:8,dgx08:8"), "{body}");
}

#[test]
fn unsupported_node_count_writes_nothing() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let output = run(sandbox.command(ORTE_BINARY, &rank0_env("3", "a,b,c")));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unsupported node count 3"));
    assert!(!sandbox.home().join("hpl").exists());
    assert!(!sandbox.log_path("singularity").exists());
}

#[test]
fn dry_run_shows_script_without_writing_it() {
    let sandbox = Sandbox::new();
    let mut command = sandbox.command(ORTE_BINARY, &rank0_env("4", "n[1-4]"));
    command.arg("--dry-run");
    let output = run(command);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let plan: Value = serde_json::from_str(&stdout(&output)).expect("dry run prints JSON");
    assert_eq!(plan["variant"], "orte");
    assert_eq!(plan["grid"], "8x4");
    assert_eq!(plan["program"], "singularity");
    let body = plan["script"]["body"].as_str().expect("script body");
    assert!(body.contains("--host n1:8,n2:8,n3:8,n4:8"), "{body}");
    assert!(body.contains("-np 32"), "{body}");
    let path = plan["script"]["path"].as_str().expect("script path");
    assert!(path.ends_with("runhpl-4242.sh"));
    assert!(!std::path::Path::new(path).exists());
}

#[test]
fn relative_basedir_script_is_reachable_from_the_child() {
    let _guard = launch_lock();
    let sandbox = Sandbox::new();
    sandbox.write_config("");

    let mut command = sandbox.command(ORTE_BINARY, &rank0_env("1", "dgx01"));
    command.current_dir(sandbox.temp.path()).arg("--basedir").arg("rel");
    let output = run(command);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));

    let written = sandbox.path("rel").join("runhpl-4242.sh");
    assert!(written.is_file(), "script should land under ./rel");

    let log = sandbox.read_log("singularity");
    let base_arg = Path::new(&log[3]);
    let script_arg = Path::new(&log[7]);
    assert!(base_arg.is_absolute(), "{log:?}");
    assert!(script_arg.is_absolute(), "{log:?}");
    assert!(script_arg.is_file(), "child cannot find {}", script_arg.display());
    assert_eq!(
        fs::canonicalize(script_arg).expect("script arg resolves"),
        fs::canonicalize(&written).expect("written script resolves")
    );
}

#[test]
fn non_zero_rank_dry_run_prints_nothing() {
    let sandbox = Sandbox::new();
    let mut env = rank0_env("2", "a,b");
    env.retain(|(key, _)| *key != "SLURM_PROCID");
    env.push(("SLURM_PROCID", "3"));

    let mut command = sandbox.command(ORTE_BINARY, &env);
    command.arg("--dry-run");
    let output = run(command);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).is_empty(), "{}", stdout(&output));
}

#[test]
fn non_zero_rank_skips_argument_parsing() {
    let sandbox = Sandbox::new();
    let mut command = sandbox.command(ORTE_BINARY, &[("SLURM_PROCID", "2")]);
    command.arg("--bogus");
    let output = run(command);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(!stderr(&output).contains("--bogus"), "{}", stderr(&output));
}
