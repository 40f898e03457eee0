//! Shared helpers reused across modules (e.g., in-container path joins).

/// Join an in-container directory and a file name with exactly one `/`.
pub fn join_container_path(dir: &str, file: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), file)
}
