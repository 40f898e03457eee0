//! Static hardware affinity for the supported node type.

/// Rank-to-hardware binding passed to the in-container `hpl.sh`.
///
/// Each colon-separated list has one entry per local rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffinityProfile {
    pub name: &'static str,
    /// Hardware tag embedded in parameter file names.
    pub dat_tag: &'static str,
    pub cpu_affinity: &'static str,
    pub cpu_cores_per_rank: u32,
    pub gpu_affinity: &'static str,
    pub mem_affinity: &'static str,
    pub ucx_affinity: &'static str,
    pub gpu_clock: &'static str,
    pub ranks_per_node: u32,
}

/// DGX A100 (40GB GPUs), eight ranks per node, one per GPU.
pub const DGX_A100_40GB: AffinityProfile = AffinityProfile {
    name: "dgx-a100-40gb",
    dat_tag: "dgx_a100_40GB",
    cpu_affinity: "32-47:48-63:0-15:16-31:96-111:112-127:64-79:80-95",
    cpu_cores_per_rank: 16,
    gpu_affinity: "0:1:2:3:4:5:6:7",
    mem_affinity: "2:3:0:1:6:7:4:5",
    ucx_affinity: "mlx5_0:mlx5_1:mlx5_2:mlx5_3:mlx5_6:mlx5_7:mlx5_8:mlx5_9",
    gpu_clock: "1410,1275",
    ranks_per_node: 8,
};

impl AffinityProfile {
    /// `hpl.sh` arguments that bind ranks to hardware, without `--dat`.
    pub fn hpl_args(&self) -> Vec<String> {
        vec![
            "--cpu-affinity".into(),
            self.cpu_affinity.into(),
            "--cpu-cores-per-rank".into(),
            self.cpu_cores_per_rank.to_string(),
            "--gpu-affinity".into(),
            self.gpu_affinity.into(),
            "--mem-affinity".into(),
            self.mem_affinity.into(),
            "--ucx-affinity".into(),
            self.ucx_affinity.into(),
            "--gpu-clock".into(),
            self.gpu_clock.into(),
        ]
    }

    /// Environment mirror of the affinity settings.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CPU_AFFINITY", self.cpu_affinity.to_string()),
            ("CPU_CORES_PER_RANK", self.cpu_cores_per_rank.to_string()),
            ("GPU_AFFINITY", self.gpu_affinity.to_string()),
            ("MEM_AFFINITY", self.mem_affinity.to_string()),
            ("UCX_AFFINITY", self.ucx_affinity.to_string()),
            ("GPU_CLOCK", self.gpu_clock.to_string()),
        ]
    }
}
