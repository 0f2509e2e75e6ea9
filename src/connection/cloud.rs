//! Cluster status as reported by `GET /3/Cloud`

use serde::{Deserialize, Serialize};

/// Status of the H2O cloud
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CloudStatus {
    /// H2O build version
    pub version: String,
    /// Name the cloud was started with
    pub cloud_name: String,
    /// Number of nodes that joined
    pub cloud_size: u32,
    /// All nodes are healthy
    pub cloud_healthy: bool,
    /// All nodes agree on membership
    #[serde(default)]
    pub consensus: bool,
    /// Membership is locked (a job has run)
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub cloud_uptime_millis: u64,
    #[serde(default)]
    pub nodes: Vec<NodeStatus>,
}

/// One node of the cloud
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeStatus {
    pub ip_port: String,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub num_cpus: u32,
    #[serde(default)]
    pub free_mem: u64,
}

impl CloudStatus {
    /// Reason the cloud cannot accept work, if any
    pub fn unhealthy_reason(&self) -> Option<String> {
        if self.cloud_size == 0 {
            return Some(format!("cloud '{}' has no nodes", self.cloud_name));
        }
        if !self.cloud_healthy {
            let sick: Vec<&str> = self
                .nodes
                .iter()
                .filter(|n| !n.healthy)
                .map(|n| n.ip_port.as_str())
                .collect();
            return Some(if sick.is_empty() {
                format!("cloud '{}' reports unhealthy", self.cloud_name)
            } else {
                format!(
                    "cloud '{}' has unhealthy nodes: {}",
                    self.cloud_name,
                    sick.join(", ")
                )
            });
        }
        None
    }

    /// Total CPUs across all nodes
    pub fn total_cpus(&self) -> u32 {
        self.nodes.iter().map(|n| n.num_cpus).sum()
    }
}
