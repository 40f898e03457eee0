//! Library crate root re-exporting the CLI, configuration, HPL launch, and runtime modules.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod config;
pub mod hpl;
pub mod runtime;
