//! Slurm job environment captured into an explicit value.
//!
//! Launch code never reads `SLURM_*` variables directly; it receives a
//! [`SlurmEnv`] built once at startup (or from a lookup closure in tests).

use std::env;

use crate::lib::errors::{HostListError, LaunchError, SchedulerEnvError};

pub const JOB_NUM_NODES_ENV: &str = "SLURM_JOB_NUM_NODES";
pub const NNODES_ENV: &str = "SLURM_NNODES";
pub const NTASKS_PER_NODE_ENV: &str = "SLURM_NTASKS_PER_NODE";
pub const JOB_NODELIST_ENV: &str = "SLURM_JOB_NODELIST";
pub const NODELIST_ENV: &str = "SLURM_NODELIST";
pub const JOB_ID_ENV: &str = "SLURM_JOB_ID";
pub const PROCID_ENV: &str = "SLURM_PROCID";

/// Raw values of the Slurm variables the launchers consume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlurmEnv {
    pub num_nodes: Option<String>,
    pub ntasks_per_node: Option<String>,
    pub nodelist: Option<String>,
    pub job_id: Option<String>,
    pub procid: Option<String>,
}

impl SlurmEnv {
    /// Snapshot the current process environment.
    pub fn from_process_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            num_nodes: get(JOB_NUM_NODES_ENV).or_else(|| get(NNODES_ENV)),
            ntasks_per_node: get(NTASKS_PER_NODE_ENV),
            nodelist: get(JOB_NODELIST_ENV).or_else(|| get(NODELIST_ENV)),
            job_id: get(JOB_ID_ENV),
            procid: get(PROCID_ENV),
        }
    }

    /// Rank of this task within the job step. Unset means the batch step, rank 0.
    pub fn rank(&self) -> Result<u32, SchedulerEnvError> {
        match &self.procid {
            None => Ok(0),
            Some(value) => parse_u32(PROCID_ENV, value),
        }
    }

    pub fn node_count(&self) -> Result<u32, SchedulerEnvError> {
        let value = self.num_nodes.as_deref().ok_or(SchedulerEnvError::Missing {
            var: JOB_NUM_NODES_ENV,
        })?;
        parse_u32(JOB_NUM_NODES_ENV, value)
    }

    /// Tasks per node, if Slurm exported it.
    ///
    /// Heterogeneous allocations report forms like `8(x2),4`; the leading
    /// count is used.
    pub fn tasks_per_node(&self) -> Result<Option<u32>, SchedulerEnvError> {
        let Some(value) = self.ntasks_per_node.as_deref() else {
            return Ok(None);
        };
        let leading: String = value.chars().take_while(char::is_ascii_digit).collect();
        match leading.parse::<u32>() {
            Ok(count) if count > 0 => Ok(Some(count)),
            _ => Err(SchedulerEnvError::Invalid {
                var: NTASKS_PER_NODE_ENV,
                value: value.to_string(),
            }),
        }
    }

    pub fn job_id(&self) -> Result<&str, SchedulerEnvError> {
        self.job_id
            .as_deref()
            .ok_or(SchedulerEnvError::Missing { var: JOB_ID_ENV })
    }

    /// Allocated hostnames in scheduler order.
    pub fn hostnames(&self) -> Result<Vec<String>, LaunchError> {
        let list = self.nodelist.as_deref().ok_or(SchedulerEnvError::Missing {
            var: JOB_NODELIST_ENV,
        })?;
        Ok(expand_hostlist(list)?)
    }
}

fn parse_u32(var: &'static str, value: &str) -> Result<u32, SchedulerEnvError> {
    value.parse::<u32>().map_err(|_| SchedulerEnvError::Invalid {
        var,
        value: value.to_string(),
    })
}

/// Expand Slurm's compact host-list syntax (`gpu[01-03,07],login1`).
pub fn expand_hostlist(list: &str) -> Result<Vec<String>, HostListError> {
    let mut hosts = Vec::new();
    for token in split_top_level(list)? {
        hosts.extend(expand_token(list, token)?);
    }
    if hosts.is_empty() {
        return Err(HostListError::Empty);
    }
    Ok(hosts)
}

fn split_top_level(list: &str) -> Result<Vec<&str>, HostListError> {
    let unbalanced = || HostListError::UnbalancedBrackets {
        list: list.to_string(),
    };
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in list.char_indices() {
        match ch {
            '[' => {
                if depth > 0 {
                    return Err(unbalanced());
                }
                depth += 1;
            }
            ']' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            ',' if depth == 0 => {
                tokens.push(&list[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    tokens.push(&list[start..]);
    Ok(tokens
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect())
}

fn expand_token(list: &str, token: &str) -> Result<Vec<String>, HostListError> {
    let Some(open) = token.find('[') else {
        return Ok(vec![token.to_string()]);
    };
    // split_top_level already rejected unbalanced or nested groups.
    let close = open
        + token[open..]
            .find(']')
            .ok_or_else(|| HostListError::UnbalancedBrackets {
                list: list.to_string(),
            })?;
    let prefix = &token[..open];
    let suffixes = expand_token(list, &token[close + 1..])?;

    let mut hosts = Vec::new();
    for item in token[open + 1..close].split(',') {
        for index in expand_range(list, item.trim())? {
            for suffix in &suffixes {
                hosts.push(format!("{prefix}{index}{suffix}"));
            }
        }
    }
    Ok(hosts)
}

fn expand_range(list: &str, item: &str) -> Result<Vec<String>, HostListError> {
    let invalid = || HostListError::InvalidRange {
        list: list.to_string(),
        range: item.to_string(),
    };
    let is_index = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    let Some((lo, hi)) = item.split_once('-') else {
        if !is_index(item) {
            return Err(invalid());
        }
        return Ok(vec![item.to_string()]);
    };
    if !is_index(lo) || !is_index(hi) {
        return Err(invalid());
    }
    let start: u64 = lo.parse().map_err(|_| invalid())?;
    let end: u64 = hi.parse().map_err(|_| invalid())?;
    if start > end {
        return Err(invalid());
    }
    let width = lo.len();
    Ok((start..=end)
        .map(|n| format!("{n:0width$}"))
        .collect())
}
