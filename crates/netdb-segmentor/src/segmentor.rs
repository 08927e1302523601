//! Segmentor: routes every lookup and store to its partition
//!
//! The client map is copy-on-write behind an `ArcSwap`. Readers load a
//! snapshot without locking; writers insert-if-absent through `rcu`, so two
//! threads creating the same client partition agree on a single instance.
//! Store startup runs under that partition's own transition lock and never
//! blocks resolution of other partitions.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use netdb_core::{
    BlindData, DatabaseEntry, Hash, LeaseRecord, PartitionId, PeerDescriptor, SegmentorConfig,
    SigningPublicKey, WellKnown,
};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::contract::SegmentedDatabase;
use crate::enumerator::PartitionEnumerator;
use crate::error::{Result, SegmentorError};
use crate::metrics;
use crate::partition::{Lifecycle, Partition};
use crate::policy::IsolationPolicy;
use crate::stats::{PartitionStats, SegmentorStats};
use crate::store::StoreFactory;

type ClientMap = HashMap<Hash, Arc<Partition>>;

pub struct Segmentor {
    main: Arc<Partition>,
    multihome: Arc<Partition>,
    exploratory: Arc<Partition>,
    clients: ArcSwap<ClientMap>,
    factory: Arc<dyn StoreFactory>,
    policy: IsolationPolicy,
    seed_peer_count: usize,
    enumerator: Option<Arc<dyn PartitionEnumerator>>,
    closed: AtomicBool,
}

impl Segmentor {
    /// Build a segmentor and start the three well-known partitions
    pub fn new(config: SegmentorConfig, factory: Arc<dyn StoreFactory>) -> Result<Self> {
        SegmentorBuilder::new(factory).config(config).build()
    }

    pub fn isolation_enabled(&self) -> bool {
        self.policy.is_enabled()
    }

    /// Flip the isolation switch. Existing client partitions are kept.
    pub fn set_isolation_enabled(&self, enabled: bool) {
        let previous = self.policy.set_enabled(enabled);
        if previous != enabled {
            info!(enabled, "Client partition isolation toggled");
        }
    }

    /// Every client partition currently in the map, whatever its state
    pub fn tracked_clients(&self) -> usize {
        self.clients.load().len()
    }

    fn well_known(&self, wk: WellKnown) -> Arc<Partition> {
        match wk {
            WellKnown::Main => self.main(),
            WellKnown::Multihome => self.multihome(),
            WellKnown::Exploratory => self.exploratory(),
        }
    }

    /// Partition for client `hash`, creating and seeding it on first use
    fn client(&self, hash: Hash) -> Result<Arc<Partition>> {
        loop {
            if self.closed.load(Ordering::SeqCst) {
                return Err(SegmentorError::Closed);
            }

            let existing = self.clients.load().get(&hash).cloned();
            let partition = match existing {
                Some(partition) => partition,
                None => self.register(hash),
            };

            if partition.is_ready() || self.start_client(&hash, &partition)? {
                return Ok(partition);
            }

            // torn down between lookup and startup; drop the stale entry and retry
            self.unregister(&hash, &partition);
        }
    }

    /// Insert a fresh partition for `hash` unless one is already registered.
    /// Returns whichever instance ended up in the map.
    fn register(&self, hash: Hash) -> Arc<Partition> {
        let id = PartitionId::Client(hash);
        let candidate = Arc::new(Partition::new(id, self.factory.create(id)));

        let mut winner = None;
        self.clients.rcu(|current| {
            if let Some(existing) = current.get(&hash) {
                winner = Some(existing.clone());
                return Arc::clone(current);
            }
            winner = None;
            let mut next = (**current).clone();
            next.insert(hash, candidate.clone());
            Arc::new(next)
        });

        match winner {
            Some(existing) => {
                metrics::record_creation_race();
                debug!(partition = %id, "Lost client partition creation race, discarding store");
                existing
            }
            None => {
                metrics::set_client_partitions(self.clients.load().len());
                candidate
            }
        }
    }

    /// Remove `partition` from the map if it is still the registered instance
    fn unregister(&self, hash: &Hash, partition: &Arc<Partition>) -> bool {
        let mut removed = false;
        self.clients.rcu(|current| match current.get(hash) {
            Some(existing) if Arc::ptr_eq(existing, partition) => {
                removed = true;
                let mut next = (**current).clone();
                next.remove(hash);
                Arc::new(next)
            }
            _ => {
                removed = false;
                Arc::clone(current)
            }
        });

        if removed {
            metrics::set_client_partitions(self.clients.load().len());
        }
        removed
    }

    /// Start and seed a registered client partition.
    ///
    /// Returns `Ok(false)` if the partition was shut down before it could
    /// start. On startup failure the partition is unregistered before the
    /// transition lock is released, so no caller can reach it afterwards.
    fn start_client(&self, hash: &Hash, partition: &Arc<Partition>) -> Result<bool> {
        let _guard = partition.lock_transition();
        match partition.lifecycle() {
            Lifecycle::Ready => return Ok(true),
            Lifecycle::ShutDown => return Ok(false),
            Lifecycle::Creating => {}
        }

        if self.closed.load(Ordering::SeqCst) {
            self.unregister(hash, partition);
            partition.set_lifecycle(Lifecycle::ShutDown);
            return Err(SegmentorError::Closed);
        }

        if let Err(e) = partition.backend().startup() {
            self.unregister(hash, partition);
            partition.set_lifecycle(Lifecycle::ShutDown);
            warn!(partition = %partition.id(), error = %e, "Client partition store failed to start");
            return Err(e);
        }

        self.seed(partition);
        partition.set_lifecycle(Lifecycle::Ready);

        metrics::record_partition_created(partition.id().kind());
        info!(partition = %partition.id(), "Created client partition");
        Ok(true)
    }

    /// Copy a random sample of main's floodfill descriptors into an empty
    /// client partition. Never fails.
    fn seed(&self, partition: &Partition) {
        if self.seed_peer_count == 0 || !partition.known_floodfill_peers().is_empty() {
            return;
        }

        let candidates = self.main.known_floodfill_peers();
        if candidates.is_empty() {
            metrics::record_seeding_skipped();
            debug!(partition = %partition.id(), "No floodfill peers in main partition, skipping seeding");
            return;
        }

        let mut rng = rand::thread_rng();
        let mut seeded = 0;
        for peer in candidates.choose_multiple(&mut rng, self.seed_peer_count) {
            let Some(ri) = self.main.lookup_router_locally(peer) else {
                continue;
            };
            match partition.store(*peer, DatabaseEntry::Router(ri)) {
                Ok(()) => seeded += 1,
                Err(e) => {
                    warn!(partition = %partition.id(), peer = %peer.short(), error = %e, "Failed to seed peer");
                }
            }
        }

        metrics::record_seeded_peers(seeded);
        debug!(
            partition = %partition.id(),
            seeded,
            available = candidates.len(),
            "Seeded client partition"
        );
    }

    /// Ready client partitions, ordered by id
    fn ready_clients(&self) -> Vec<Arc<Partition>> {
        let snapshot = self.clients.load_full();
        let mut ready: Vec<_> = snapshot.values().filter(|p| p.is_ready()).cloned().collect();
        ready.sort_by_key(|p| p.id());
        ready
    }

    /// The partitions clients use; main stands in for all of them when
    /// isolation is off
    fn client_view(&self) -> Vec<Arc<Partition>> {
        if !self.policy.is_enabled() {
            return vec![self.main.clone()];
        }
        self.ready_clients()
    }

    /// Ready client partitions eligible to own a lease key
    fn owner_candidates(&self) -> Vec<Arc<Partition>> {
        if !self.policy.is_enabled() {
            return Vec::new();
        }
        let mut candidates = self.ready_clients();
        if let Some(enumerator) = &self.enumerator {
            candidates.retain(|p| p.id().client_hash().map_or(false, |h| enumerator.is_live(h)));
        }
        candidates
    }

    fn find_owner(&self, key: &Hash) -> Option<Arc<Partition>> {
        self.owner_candidates().into_iter().find(|p| p.match_client_key(key))
    }
}

impl SegmentedDatabase for Segmentor {
    fn resolve(&self, id: Option<PartitionId>) -> Result<Arc<Partition>> {
        match id {
            None => Ok(self.main()),
            Some(PartitionId::WellKnown(wk)) => Ok(self.well_known(wk)),
            Some(PartitionId::Client(hash)) => {
                if !self.policy.is_enabled() {
                    return Ok(self.main());
                }
                self.client(hash)
            }
        }
    }

    fn main(&self) -> Arc<Partition> {
        self.main.clone()
    }

    fn multihome(&self) -> Arc<Partition> {
        if !self.policy.is_enabled() {
            return self.main.clone();
        }
        self.multihome.clone()
    }

    fn exploratory(&self) -> Arc<Partition> {
        self.exploratory.clone()
    }

    fn client_partition(&self, id: Option<PartitionId>) -> Result<Arc<Partition>> {
        match id {
            None if !self.policy.is_enabled() => Ok(self.main()),
            None => Ok(self.exploratory()),
            Some(id) => self.resolve(Some(id)),
        }
    }

    fn lookup_lease_by_owner_unknown(&self, key: &Hash) -> Option<LeaseRecord> {
        if let Some(owner) = self.find_owner(key) {
            metrics::record_owner_lookup(metrics::OWNER_CLIENT);
            return owner.lookup_lease_locally(key);
        }

        let found = self.main.lookup_lease_locally(key);
        metrics::record_owner_lookup(if found.is_some() {
            metrics::OWNER_MAIN
        } else {
            metrics::OWNER_MISS
        });
        found
    }

    fn partition(&self, id: PartitionId) -> Option<Arc<Partition>> {
        match id {
            PartitionId::WellKnown(wk) => Some(self.well_known(wk)),
            PartitionId::Client(_) if !self.policy.is_enabled() => Some(self.main()),
            PartitionId::Client(hash) => self
                .clients
                .load()
                .get(&hash)
                .filter(|p| p.is_ready())
                .cloned(),
        }
    }

    fn partitions(&self) -> Vec<Arc<Partition>> {
        if !self.policy.is_enabled() {
            return vec![self.main.clone()];
        }
        let mut all = vec![self.main.clone(), self.multihome.clone(), self.exploratory.clone()];
        all.extend(self.ready_clients());
        all
    }

    fn owner_of(&self, key: &Hash) -> Option<PartitionId> {
        self.find_owner(key).map(|p| p.id())
    }

    fn all_routers(&self) -> HashSet<PeerDescriptor> {
        self.partitions()
            .iter()
            .flat_map(|p| p.known_routers())
            .collect()
    }

    fn all_leases_known_to_clients(&self) -> HashSet<LeaseRecord> {
        self.client_view().iter().flat_map(|p| p.known_leases()).collect()
    }

    fn all_routers_known_to_clients(&self) -> HashSet<PeerDescriptor> {
        self.client_view().iter().flat_map(|p| p.known_routers()).collect()
    }

    fn all_floodfill_peers(&self) -> Vec<Hash> {
        let peers: BTreeSet<Hash> = self
            .partitions()
            .iter()
            .flat_map(|p| p.known_floodfill_peers())
            .collect();
        peers.into_iter().collect()
    }

    fn client_ids_for(&self, signing_key: &SigningPublicKey) -> Vec<PartitionId> {
        let mut view = self.client_view();
        if self.policy.is_enabled() {
            if let Some(enumerator) = &self.enumerator {
                view.retain(|p| p.id().client_hash().map_or(false, |h| enumerator.is_live(h)));
            }
        }
        view.iter()
            .filter(|p| p.blind_data_for(signing_key).is_some())
            .map(|p| p.id())
            .collect()
    }

    fn client_ids(&self) -> Vec<PartitionId> {
        if !self.policy.is_enabled() {
            return Vec::new();
        }
        self.ready_clients().iter().map(|p| p.id()).collect()
    }

    fn is_initialized(&self) -> bool {
        self.partitions().iter().all(|p| p.is_initialized())
    }

    fn all_blind_data(&self) -> Vec<BlindData> {
        let all: HashSet<BlindData> = self
            .partitions()
            .iter()
            .flat_map(|p| p.all_blind_data())
            .collect();
        all.into_iter().collect()
    }

    fn remove_client(&self, client: &Hash) -> bool {
        let Some(partition) = self.clients.load().get(client).cloned() else {
            debug!(client = %client.short(), "No client partition to tear down");
            return false;
        };

        self.unregister(client, &partition);
        let stopped = partition.shutdown();
        if stopped {
            metrics::record_partition_torn_down(partition.id().kind());
            info!(partition = %partition.id(), "Tore down client partition");
        }
        stopped
    }

    fn stats(&self) -> SegmentorStats {
        SegmentorStats {
            isolation_enabled: self.policy.is_enabled(),
            main: PartitionStats::of(&self.main),
            multihome: PartitionStats::of(&self.multihome),
            exploratory: PartitionStats::of(&self.exploratory),
            client_partitions: self.client_ids().len(),
        }
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let clients = self.clients.swap(Arc::new(ClientMap::new()));
        metrics::set_client_partitions(0);

        let mut stopped = 0;
        for partition in [&self.main, &self.multihome, &self.exploratory]
            .into_iter()
            .chain(clients.values())
        {
            if partition.shutdown() {
                metrics::record_partition_torn_down(partition.id().kind());
                debug!(partition = %partition.id(), "Shut down partition");
                stopped += 1;
            }
        }

        info!(stopped, "Shut down segmented network database");
    }
}

/// Builder for [`Segmentor`]
pub struct SegmentorBuilder {
    factory: Arc<dyn StoreFactory>,
    config: SegmentorConfig,
    enumerator: Option<Arc<dyn PartitionEnumerator>>,
}

impl SegmentorBuilder {
    /// Builder over `factory` with the default configuration
    pub fn new(factory: Arc<dyn StoreFactory>) -> Self {
        Self {
            factory,
            config: SegmentorConfig::default(),
            enumerator: None,
        }
    }

    /// Replace the configuration; validated in [`SegmentorBuilder::build`]
    pub fn config(mut self, config: SegmentorConfig) -> Self {
        self.config = config;
        self
    }

    /// Restrict owner resolution to clients with live sessions
    pub fn enumerator(mut self, enumerator: Arc<dyn PartitionEnumerator>) -> Self {
        self.enumerator = Some(enumerator);
        self
    }

    pub fn build(self) -> Result<Segmentor> {
        self.config.validate()?;

        let factory = self.factory.as_ref();
        let main = start_well_known(factory, WellKnown::Main)?;
        let multihome = match start_well_known(factory, WellKnown::Multihome) {
            Ok(partition) => partition,
            Err(e) => {
                main.shutdown();
                return Err(e);
            }
        };
        let exploratory = match start_well_known(factory, WellKnown::Exploratory) {
            Ok(partition) => partition,
            Err(e) => {
                main.shutdown();
                multihome.shutdown();
                return Err(e);
            }
        };

        info!(
            isolation = self.config.isolation_enabled,
            seed_peers = self.config.seed_peer_count,
            "Segmented network database started"
        );

        Ok(Segmentor {
            main,
            multihome,
            exploratory,
            clients: ArcSwap::from_pointee(ClientMap::new()),
            factory: self.factory,
            policy: IsolationPolicy::new(self.config.isolation_enabled),
            seed_peer_count: self.config.seed_peer_count,
            enumerator: self.enumerator,
            closed: AtomicBool::new(false),
        })
    }
}

fn start_well_known(factory: &dyn StoreFactory, wk: WellKnown) -> Result<Arc<Partition>> {
    let id = PartitionId::WellKnown(wk);
    let partition = Arc::new(Partition::new(id, factory.create(id)));
    {
        let _guard = partition.lock_transition();
        partition.backend().startup()?;
        partition.set_lifecycle(Lifecycle::Ready);
    }
    metrics::record_partition_created(id.kind());
    debug!(partition = %id, "Started well-known partition");
    Ok(partition)
}
