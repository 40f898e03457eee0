//! HPL launch logic: topology table, affinity profile, host list, and launch plans.
pub mod affinity;
pub mod hostlist;
pub mod launch;
pub mod topology;

pub use affinity::{AffinityProfile, DGX_A100_40GB};
pub use hostlist::build_host_list;
pub use launch::{LaunchPlan, LaunchScript, LaunchVariant};
pub use topology::{select_topology, supported_node_counts, ProcessGrid, Topology, TOPOLOGIES};
