//! Shared library modules providing error types, Slurm environment access, file utilities, and telemetry initialization.

pub mod errors;
pub mod fs;
pub mod paths;
pub mod shell;
pub mod slurm;
pub mod telemetry;
