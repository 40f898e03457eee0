//! Node count to process grid mapping.
//!
//! Only the allocations with a precomputed HPL parameter file are listed.
//! Supporting another node count means adding a row to [`TOPOLOGIES`] and
//! shipping the matching parameter file.

use std::fmt;

use crate::{hpl::affinity::AffinityProfile, lib::errors::TopologyError};

/// HPL process grid `P x Q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGrid {
    pub p: u32,
    pub q: u32,
}

impl ProcessGrid {
    pub const fn new(p: u32, q: u32) -> Self {
        Self { p, q }
    }

    /// Total MPI ranks the grid needs.
    pub const fn ranks(&self) -> u32 {
        self.p * self.q
    }
}

impl fmt::Display for ProcessGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.p, self.q)
    }
}

/// One supported allocation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub nodes: u32,
    pub grid: ProcessGrid,
}

impl Topology {
    /// Parameter file shipped for this grid on the given hardware.
    pub fn dat_file_name(&self, affinity: &AffinityProfile) -> String {
        format!("HPL.dat_{}_{}", self.grid, affinity.dat_tag)
    }
}

pub const TOPOLOGIES: &[Topology] = &[
    Topology {
        nodes: 1,
        grid: ProcessGrid::new(4, 2),
    },
    Topology {
        nodes: 2,
        grid: ProcessGrid::new(4, 4),
    },
    Topology {
        nodes: 4,
        grid: ProcessGrid::new(8, 4),
    },
    Topology {
        nodes: 8,
        grid: ProcessGrid::new(8, 8),
    },
];

pub fn supported_node_counts() -> Vec<u32> {
    TOPOLOGIES.iter().map(|topology| topology.nodes).collect()
}

/// Look up the topology for an allocation; unlisted counts are an error.
pub fn select_topology(nodes: u32) -> Result<&'static Topology, TopologyError> {
    TOPOLOGIES
        .iter()
        .find(|topology| topology.nodes == nodes)
        .ok_or_else(|| TopologyError::UnsupportedNodeCount {
            nodes,
            supported: supported_node_counts()
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
}
