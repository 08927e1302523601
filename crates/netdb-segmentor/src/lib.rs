//! netdb-segmentor: Partitioned network database for multi-client routers
//!
//! Splits the network database into isolated partitions and routes every
//! lookup and store to the right one:
//!
//! - [`Segmentor`] owns the partition map, creates and seeds client
//!   partitions on demand and answers aggregate queries from snapshots
//! - [`SegmentedDatabase`] is the operation set callers program against
//! - [`IsolationPolicy`] collapses every resolution onto the main partition
//!   when isolation is switched off
//! - [`PartitionStore`] is the per-partition Kademlia store, supplied by the
//!   embedding router through a [`StoreFactory`]
//!
//! The only operation that looks across client partitions is
//! [`SegmentedDatabase::lookup_lease_by_owner_unknown`]. Everything else acts
//! on one partition, or on a read-only snapshot of all of them.

pub mod contract;
pub mod enumerator;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod partition;
pub mod policy;
pub mod segmentor;
pub mod stats;
pub mod store;

pub use contract::SegmentedDatabase;
pub use enumerator::{LiveClients, PartitionEnumerator};
pub use error::{Result, SegmentorError};
pub use memory::{MemoryStore, MemoryStoreFactory};
pub use partition::{Lifecycle, Partition};
pub use policy::IsolationPolicy;
pub use segmentor::{Segmentor, SegmentorBuilder};
pub use stats::{PartitionStats, SegmentorStats};
pub use store::{PartitionStore, StoreFactory};
