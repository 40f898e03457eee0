//! CLI entrypoint module structure.
pub mod args;
pub mod profile;

pub use args::{LaunchArgs, ParsedCommand};
pub use profile::{resolve_profile, LaunchProfile};
