//! In-memory partition store
//!
//! Keeps routers, leases and blinding data in plain maps. Used by tests and
//! the demo binary; a production router plugs its Kademlia store in through
//! [`StoreFactory`] instead.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use netdb_core::{BlindData, DatabaseEntry, Hash, LeaseRecord, PartitionId, PeerDescriptor, SigningPublicKey};
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, SegmentorError};
use crate::store::{PartitionStore, StoreFactory};

pub struct MemoryStore {
    id: PartitionId,
    routers: RwLock<HashMap<Hash, PeerDescriptor>>,
    leases: RwLock<HashMap<Hash, LeaseRecord>>,
    blind: RwLock<HashMap<SigningPublicKey, BlindData>>,
    started: AtomicBool,
    stopped: AtomicBool,
    startups: AtomicUsize,
    fail_startup: bool,
}

impl MemoryStore {
    pub fn new(id: PartitionId) -> Self {
        Self {
            id,
            routers: RwLock::new(HashMap::new()),
            leases: RwLock::new(HashMap::new()),
            blind: RwLock::new(HashMap::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            startups: AtomicUsize::new(0),
            fail_startup: false,
        }
    }

    /// A store whose `startup` always fails
    pub fn failing(id: PartitionId) -> Self {
        Self {
            fail_startup: true,
            ..Self::new(id)
        }
    }

    pub fn id(&self) -> PartitionId {
        self.id
    }

    /// Number of times `startup` has been called
    pub fn startup_count(&self) -> usize {
        self.startups.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Register blinding data for a destination served by this partition
    pub fn set_blind_data(&self, data: BlindData) -> Result<()> {
        self.check_open()?;
        self.blind.write().insert(data.signing_key, data);
        Ok(())
    }

    pub fn router_count(&self) -> usize {
        self.routers.read().len()
    }

    pub fn lease_count(&self) -> usize {
        self.leases.read().len()
    }

    fn check_open(&self) -> Result<()> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(SegmentorError::StoreShutDown(self.id));
        }
        Ok(())
    }
}

impl PartitionStore for MemoryStore {
    fn startup(&self) -> Result<()> {
        self.check_open()?;
        self.startups.fetch_add(1, Ordering::SeqCst);
        if self.fail_startup {
            return Err(SegmentorError::StoreStartup {
                id: self.id,
                reason: "startup refused".to_string(),
            });
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn store(&self, key: Hash, entry: DatabaseEntry) -> Result<()> {
        self.check_open()?;
        match entry {
            DatabaseEntry::Router(ri) => {
                self.routers.write().insert(key, ri);
            }
            DatabaseEntry::Lease(ls) => {
                self.leases.write().insert(key, ls);
            }
        }
        Ok(())
    }

    fn lookup_locally(&self, key: &Hash) -> Option<DatabaseEntry> {
        if let Some(ls) = self.leases.read().get(key) {
            return Some(DatabaseEntry::Lease(ls.clone()));
        }
        self.routers.read().get(key).cloned().map(DatabaseEntry::Router)
    }

    fn known_floodfill_peers(&self) -> Vec<Hash> {
        self.routers
            .read()
            .iter()
            .filter(|(_, ri)| ri.floodfill)
            .map(|(key, _)| *key)
            .collect()
    }

    fn known_routers(&self) -> HashSet<PeerDescriptor> {
        self.routers.read().values().cloned().collect()
    }

    fn known_leases(&self) -> HashSet<LeaseRecord> {
        self.leases.read().values().cloned().collect()
    }

    fn is_initialized(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst)
    }

    /// A client store claims its own destination and any lease it holds.
    /// Well-known stores never claim a key.
    fn match_client_key(&self, key: &Hash) -> bool {
        match self.id.client_hash() {
            Some(owner) => owner == key || self.leases.read().contains_key(key),
            None => false,
        }
    }

    fn blind_data_for(&self, signing_key: &SigningPublicKey) -> Option<BlindData> {
        self.blind.read().get(signing_key).cloned()
    }

    fn all_blind_data(&self) -> Vec<BlindData> {
        self.blind.read().values().cloned().collect()
    }
}

/// Factory producing [`MemoryStore`]s, remembering every store it built
#[derive(Default)]
pub struct MemoryStoreFactory {
    built: Mutex<Vec<Arc<MemoryStore>>>,
    failing: Mutex<HashSet<PartitionId>>,
}

impl MemoryStoreFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every store built for `id`, including ones discarded after a lost race
    pub fn stores_for(&self, id: PartitionId) -> Vec<Arc<MemoryStore>> {
        self.built.lock().iter().filter(|s| s.id() == id).cloned().collect()
    }

    /// The most recently built store for `id`
    pub fn store_for(&self, id: PartitionId) -> Option<Arc<MemoryStore>> {
        self.built.lock().iter().rev().find(|s| s.id() == id).cloned()
    }

    pub fn built_count(&self) -> usize {
        self.built.lock().len()
    }

    /// Stores built for `id` from now on fail to start
    pub fn fail_startup(&self, id: PartitionId) {
        self.failing.lock().insert(id);
    }

    pub fn allow_startup(&self, id: PartitionId) {
        self.failing.lock().remove(&id);
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn create(&self, id: PartitionId) -> Arc<dyn PartitionStore> {
        let store = if self.failing.lock().contains(&id) {
            Arc::new(MemoryStore::failing(id))
        } else {
            Arc::new(MemoryStore::new(id))
        };
        self.built.lock().push(store.clone());
        store
    }
}
