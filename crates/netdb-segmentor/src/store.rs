//! Per-partition store interface
//!
//! A store is the Kademlia engine behind one partition: replication, flooding,
//! persistence and expiration all live behind this trait. The segmentor only
//! calls it.

use std::collections::HashSet;
use std::sync::Arc;

use netdb_core::{BlindData, DatabaseEntry, Hash, LeaseRecord, PartitionId, PeerDescriptor, SigningPublicKey};

use crate::error::Result;

/// Operations the segmentor consumes from a partition's store
pub trait PartitionStore: Send + Sync {
    /// Start the store. Called once per partition, before it becomes visible
    /// as ready.
    fn startup(&self) -> Result<()>;

    /// Stop the store. Must tolerate repeated calls.
    fn shutdown(&self);

    /// Store an entry under `key`
    fn store(&self, key: Hash, entry: DatabaseEntry) -> Result<()>;

    /// Look up an entry without any network activity
    fn lookup_locally(&self, key: &Hash) -> Option<DatabaseEntry>;

    /// Identities of known floodfill routers
    fn known_floodfill_peers(&self) -> Vec<Hash>;

    fn known_routers(&self) -> HashSet<PeerDescriptor>;

    fn known_leases(&self) -> HashSet<LeaseRecord>;

    fn is_initialized(&self) -> bool;

    /// Whether this store belongs to the client owning lease key `key`
    fn match_client_key(&self, key: &Hash) -> bool;

    fn blind_data_for(&self, signing_key: &SigningPublicKey) -> Option<BlindData>;

    fn all_blind_data(&self) -> Vec<BlindData>;
}

/// Builds a fresh store for a partition id
///
/// The segmentor may build a store and then discard it unstarted when it
/// loses a creation race, so construction must have no side effects that
/// need undoing.
pub trait StoreFactory: Send + Sync {
    fn create(&self, id: PartitionId) -> Arc<dyn PartitionStore>;
}

impl<F> StoreFactory for F
where
    F: Fn(PartitionId) -> Arc<dyn PartitionStore> + Send + Sync,
{
    fn create(&self, id: PartitionId) -> Arc<dyn PartitionStore> {
        self(id)
    }
}
