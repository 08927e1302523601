//! The operation set every caller of the segmented database programs against

use std::collections::HashSet;
use std::sync::Arc;

use netdb_core::{BlindData, Hash, LeaseRecord, PartitionId, PeerDescriptor, SigningPublicKey};

use crate::error::Result;
use crate::partition::Partition;
use crate::stats::SegmentorStats;

/// Segmented network database
///
/// Callers should always reach their partition through the id of the
/// destination they act for, or through one of the well-known partitions.
/// Only [`SegmentedDatabase::lookup_lease_by_owner_unknown`] searches across
/// client partitions, and only through the owner predicate.
///
/// Aggregate reads enumerate the partitions that exist at the time of the
/// call; none of them creates a partition.
pub trait SegmentedDatabase {
    /// Partition for `id`, creating a client partition on first use.
    /// An absent id means the main partition.
    fn resolve(&self, id: Option<PartitionId>) -> Result<Arc<Partition>>;

    fn main(&self) -> Arc<Partition>;

    fn multihome(&self) -> Arc<Partition>;

    fn exploratory(&self) -> Arc<Partition>;

    /// Like [`SegmentedDatabase::resolve`], but an absent id means the
    /// exploratory partition.
    fn client_partition(&self, id: Option<PartitionId>) -> Result<Arc<Partition>>;

    /// Lease lookup for a key whose owning client is not known to the caller.
    /// Looks in the client partition claiming the key, else in main.
    fn lookup_lease_by_owner_unknown(&self, key: &Hash) -> Option<LeaseRecord>;

    /// Partition already serving `id`, never creating one. Client ids land
    /// on main while isolation is off.
    fn partition(&self, id: PartitionId) -> Option<Arc<Partition>>;

    /// Snapshot of the current partition set: the well-known partitions and
    /// every ready client, or main alone while isolation is off
    fn partitions(&self) -> Vec<Arc<Partition>>;

    /// Lease lookup in exactly one existing partition. An absent id means
    /// main; an untracked client id finds nothing.
    fn lookup_lease_locally(&self, key: &Hash, id: Option<PartitionId>) -> Option<LeaseRecord> {
        let partition = match id {
            None => self.main(),
            Some(id) => self.partition(id)?,
        };
        partition.lookup_lease_locally(key)
    }

    /// Client partition claiming lease key `key`, if any
    fn owner_of(&self, key: &Hash) -> Option<PartitionId>;

    fn all_routers(&self) -> HashSet<PeerDescriptor>;

    fn all_leases_known_to_clients(&self) -> HashSet<LeaseRecord>;

    fn all_routers_known_to_clients(&self) -> HashSet<PeerDescriptor>;

    /// De-duplicated floodfill peers over every current partition
    fn all_floodfill_peers(&self) -> Vec<Hash>;

    /// Client partitions holding blinding data for `signing_key`
    fn client_ids_for(&self, signing_key: &SigningPublicKey) -> Vec<PartitionId>;

    fn client_ids(&self) -> Vec<PartitionId>;

    /// True only when every current partition is initialized
    fn is_initialized(&self) -> bool;

    /// Blinding data held by the main partition
    fn blind_data(&self, signing_key: &SigningPublicKey) -> Option<BlindData> {
        self.main().blind_data_for(signing_key)
    }

    fn all_blind_data(&self) -> Vec<BlindData>;

    /// Tear down one client partition. Returns false when there was nothing
    /// to tear down.
    fn remove_client(&self, client: &Hash) -> bool;

    fn stats(&self) -> SegmentorStats;

    /// Tear down every tracked partition
    fn shutdown(&self);
}
