//! Partition handle: one store bound to one partition id

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use netdb_core::{BlindData, DatabaseEntry, Hash, LeaseRecord, PartitionId, PeerDescriptor, SigningPublicKey};
use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::store::PartitionStore;

/// Lifecycle of a partition
///
/// Client partitions move `Creating -> Ready -> ShutDown`. Well-known
/// partitions are started when the segmentor is built and never pass through
/// `Creating` from a caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    Creating = 0,
    Ready = 1,
    ShutDown = 2,
}

impl Lifecycle {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Lifecycle::Creating,
            1 => Lifecycle::Ready,
            _ => Lifecycle::ShutDown,
        }
    }
}

/// A sub-database
///
/// Handles are shared as `Arc<Partition>`; the segmentor owns the only
/// registry of them.
pub struct Partition {
    id: PartitionId,
    backend: Arc<dyn PartitionStore>,
    state: AtomicU8,
    /// Serializes startup and teardown for this partition only
    transition: Mutex<()>,
}

impl Partition {
    pub(crate) fn new(id: PartitionId, backend: Arc<dyn PartitionStore>) -> Self {
        Self {
            id,
            backend,
            state: AtomicU8::new(Lifecycle::Creating as u8),
            transition: Mutex::new(()),
        }
    }

    /// Id this partition serves
    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Started and not yet shut down
    pub fn is_ready(&self) -> bool {
        self.lifecycle() == Lifecycle::Ready
    }

    /// The underlying store
    pub fn backend(&self) -> &Arc<dyn PartitionStore> {
        &self.backend
    }

    pub(crate) fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.transition.lock()
    }

    /// Caller must hold the transition lock
    pub(crate) fn set_lifecycle(&self, state: Lifecycle) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Shut the store down. Returns false if it already was.
    pub(crate) fn shutdown(&self) -> bool {
        let _guard = self.transition.lock();
        match self.lifecycle() {
            Lifecycle::ShutDown => false,
            Lifecycle::Ready => {
                self.backend.shutdown();
                self.set_lifecycle(Lifecycle::ShutDown);
                true
            }
            Lifecycle::Creating => {
                // never started, nothing to stop
                self.set_lifecycle(Lifecycle::ShutDown);
                true
            }
        }
    }

    pub fn store(&self, key: Hash, entry: impl Into<DatabaseEntry>) -> Result<()> {
        self.backend.store(key, entry.into())
    }

    pub fn lookup_locally(&self, key: &Hash) -> Option<DatabaseEntry> {
        self.backend.lookup_locally(key)
    }

    pub fn lookup_lease_locally(&self, key: &Hash) -> Option<LeaseRecord> {
        self.backend.lookup_locally(key).and_then(DatabaseEntry::into_lease)
    }

    pub fn lookup_router_locally(&self, key: &Hash) -> Option<PeerDescriptor> {
        match self.backend.lookup_locally(key)? {
            DatabaseEntry::Router(ri) => Some(ri),
            DatabaseEntry::Lease(_) => None,
        }
    }

    pub fn known_floodfill_peers(&self) -> Vec<Hash> {
        self.backend.known_floodfill_peers()
    }

    pub fn known_routers(&self) -> HashSet<PeerDescriptor> {
        self.backend.known_routers()
    }

    pub fn known_leases(&self) -> HashSet<LeaseRecord> {
        self.backend.known_leases()
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_initialized()
    }

    pub fn match_client_key(&self, key: &Hash) -> bool {
        self.backend.match_client_key(key)
    }

    pub fn blind_data_for(&self, signing_key: &SigningPublicKey) -> Option<BlindData> {
        self.backend.blind_data_for(signing_key)
    }

    pub fn all_blind_data(&self) -> Vec<BlindData> {
        self.backend.all_blind_data()
    }
}

impl fmt::Debug for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn started(id: PartitionId) -> (Partition, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(id));
        let partition = Partition::new(id, store.clone());
        store.startup().unwrap();
        partition.set_lifecycle(Lifecycle::Ready);
        (partition, store)
    }

    #[test]
    fn test_typed_lookups() {
        let (partition, _) = started(PartitionId::MAIN);
        let ri = PeerDescriptor::new(Hash::digest("r"), true);
        let ls = LeaseRecord::new(Hash::digest("d"));
        partition.store(ri.identity, ri.clone()).unwrap();
        partition.store(ls.key, ls.clone()).unwrap();

        assert_eq!(partition.lookup_router_locally(&ri.identity), Some(ri.clone()));
        assert_eq!(partition.lookup_lease_locally(&ls.key), Some(ls));
        assert_eq!(partition.lookup_lease_locally(&ri.identity), None);
        assert_eq!(partition.lookup_router_locally(&Hash::digest("d")), None);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (partition, store) = started(PartitionId::EXPLORATORY);
        assert!(partition.is_ready());

        assert!(partition.shutdown());
        assert!(!partition.shutdown());
        assert_eq!(partition.lifecycle(), Lifecycle::ShutDown);
        assert!(store.is_shut_down());
    }

    #[test]
    fn test_shutdown_before_startup_skips_store() {
        let id = PartitionId::client(Hash::digest("alice"));
        let store = Arc::new(MemoryStore::new(id));
        let partition = Partition::new(id, store.clone());

        assert!(partition.shutdown());
        assert!(!store.is_shut_down());
        assert_eq!(partition.lifecycle(), Lifecycle::ShutDown);
    }
}
