//! Counts for console rendering
//!
//! Client partitions are reported as a count only.

use netdb_core::PartitionId;
use serde::Serialize;

use crate::partition::Partition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    pub id: PartitionId,
    pub routers: usize,
    pub leases: usize,
    pub floodfill_peers: usize,
    pub initialized: bool,
}

impl PartitionStats {
    pub fn of(partition: &Partition) -> Self {
        Self {
            id: partition.id(),
            routers: partition.known_routers().len(),
            leases: partition.known_leases().len(),
            floodfill_peers: partition.known_floodfill_peers().len(),
            initialized: partition.is_initialized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentorStats {
    pub isolation_enabled: bool,
    pub main: PartitionStats,
    pub multihome: PartitionStats,
    pub exploratory: PartitionStats,
    /// Ready client partitions
    pub client_partitions: usize,
}
