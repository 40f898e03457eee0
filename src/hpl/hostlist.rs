//! `mpirun --host` argument for the ORTE launcher.

/// Join hostnames into `host:slots,host:slots`.
///
/// Scheduler output is trusted: duplicates and reachability are not checked.
pub fn build_host_list<S: AsRef<str>>(hosts: &[S], slots: u32) -> String {
    hosts
        .iter()
        .map(|host| format!("{}:{slots}", host.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}
