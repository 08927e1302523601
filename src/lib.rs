//! segmented-netdb: partitioned network database for multi-client routers
//!
//! Re-exports the core types and the segmentor so integration tests and
//! embedding routers can depend on a single crate.

pub use netdb_core::{
    BlindData, DatabaseEntry, Hash, LeaseRecord, PartitionId, PeerDescriptor, SegmentorConfig,
    SigningPublicKey, WellKnown,
};
pub use netdb_segmentor::{
    LiveClients, MemoryStore, MemoryStoreFactory, Partition, PartitionEnumerator, PartitionStore,
    SegmentedDatabase, Segmentor, SegmentorBuilder, SegmentorError, StoreFactory,
};
