//! Launcher startup shared by both binaries.
mod startup;

pub use startup::{run_launcher, RuntimeExit};
