//! Isolation between partitions
//!
//! Entries stored for one client must not be visible to another through
//! normal lookups; the owner-unknown lookup is the only path across, and the
//! isolation switch collapses routing onto main without touching existing
//! client partitions.

use std::sync::Arc;

use segmented_netdb::{
    Hash, LeaseRecord, MemoryStoreFactory, PartitionId, PeerDescriptor, SegmentedDatabase, Segmentor,
    SegmentorConfig, SigningPublicKey,
};

fn segmentor() -> Segmentor {
    Segmentor::new(SegmentorConfig::default(), Arc::new(MemoryStoreFactory::new()))
        .expect("segmentor should start")
}

fn client(name: &str) -> PartitionId {
    PartitionId::client(Hash::digest(name))
}

#[test]
fn test_lease_not_visible_to_other_client() {
    let db = segmentor();
    let key = Hash::digest("a-site");
    let lease = LeaseRecord::new(key).with_lease(Hash::digest("gw"), 7, 60_000);

    db.resolve(Some(client("a"))).unwrap().store(key, lease.clone()).unwrap();

    assert_eq!(db.resolve(Some(client("b"))).unwrap().lookup_locally(&key), None);
    assert_eq!(db.main().lookup_locally(&key), None);
    assert_eq!(db.exploratory().lookup_locally(&key), None);
    assert_eq!(
        db.resolve(Some(client("a"))).unwrap().lookup_lease_locally(&key),
        Some(lease)
    );
}

#[test]
fn test_lookup_lease_locally_targets_one_partition() {
    let db = segmentor();
    let key = Hash::digest("a-site");
    db.resolve(Some(client("a"))).unwrap().store(key, LeaseRecord::new(key)).unwrap();

    assert!(db.lookup_lease_locally(&key, Some(client("a"))).is_some());
    assert!(db.lookup_lease_locally(&key, Some(client("b"))).is_none());
    assert!(db.lookup_lease_locally(&key, None).is_none());
}

#[test]
fn test_lookup_lease_locally_untracked_client_creates_nothing() {
    let factory = Arc::new(MemoryStoreFactory::new());
    let db = Segmentor::new(SegmentorConfig::default(), factory.clone()).unwrap();
    let ff = PeerDescriptor::new(Hash::digest("ff"), true);
    db.main().store(ff.identity, ff).unwrap();

    assert_eq!(db.lookup_lease_locally(&Hash::digest("k"), Some(client("ghost"))), None);

    assert_eq!(factory.built_count(), 3);
    assert_eq!(db.tracked_clients(), 0);
    assert!(db.client_ids().is_empty());
    assert!(db.partition(client("ghost")).is_none());
}

#[test]
fn test_owner_unknown_lookup_finds_client_lease() {
    let db = segmentor();
    let key = Hash::digest("c-site");
    let lease = LeaseRecord::new(key).with_lease(Hash::digest("gw"), 1, 60_000);

    db.resolve(Some(client("c"))).unwrap().store(key, lease.clone()).unwrap();
    db.resolve(Some(client("d"))).unwrap();

    assert_eq!(db.owner_of(&key), Some(client("c")));
    assert_eq!(db.lookup_lease_by_owner_unknown(&key), Some(lease));
}

#[test]
fn test_owner_unknown_lookup_falls_back_to_main() {
    let db = segmentor();
    let key = Hash::digest("remote-site");
    let lease = LeaseRecord::new(key);
    db.main().store(key, lease.clone()).unwrap();
    db.resolve(Some(client("c"))).unwrap();

    assert_eq!(db.owner_of(&key), None);
    assert_eq!(db.lookup_lease_by_owner_unknown(&key), Some(lease));
}

#[test]
fn test_owner_unknown_lookup_miss_is_none() {
    let db = segmentor();
    db.resolve(Some(client("c"))).unwrap();
    assert_eq!(db.lookup_lease_by_owner_unknown(&Hash::digest("nowhere")), None);
}

#[test]
fn test_owner_unknown_lookup_does_not_scan_well_known() {
    let db = segmentor();
    let key = Hash::digest("explored");
    db.exploratory().store(key, LeaseRecord::new(key)).unwrap();

    assert_eq!(db.lookup_lease_by_owner_unknown(&key), None);
}

#[test]
fn test_owner_unknown_lookup_creates_nothing() {
    let factory = Arc::new(MemoryStoreFactory::new());
    let db = Segmentor::new(SegmentorConfig::default(), factory.clone()).unwrap();

    let key = Hash::digest("x");
    let spk = SigningPublicKey::new([3u8; 32]);

    db.lookup_lease_by_owner_unknown(&key);
    db.owner_of(&key);
    db.lookup_lease_locally(&key, Some(client("x")));
    db.lookup_lease_locally(&key, None);
    db.partition(client("x"));
    db.partitions();
    db.all_routers();
    db.all_leases_known_to_clients();
    db.all_routers_known_to_clients();
    db.all_floodfill_peers();
    db.client_ids_for(&spk);
    db.client_ids();
    db.blind_data(&spk);
    db.all_blind_data();
    db.is_initialized();
    db.stats();

    assert_eq!(factory.built_count(), 3);
    assert_eq!(db.tracked_clients(), 0);
}

#[test]
fn test_partition_lookup_does_not_create() {
    let db = segmentor();
    let a = db.resolve(Some(client("a"))).unwrap();

    assert!(Arc::ptr_eq(&db.partition(client("a")).unwrap(), &a));
    assert!(db.partition(client("b")).is_none());
    assert!(Arc::ptr_eq(&db.partition(PartitionId::MAIN).unwrap(), &db.main()));
    assert!(Arc::ptr_eq(
        &db.partition(PartitionId::EXPLORATORY).unwrap(),
        &db.exploratory()
    ));
    assert_eq!(db.tracked_clients(), 1);

    db.set_isolation_enabled(false);
    assert!(Arc::ptr_eq(&db.partition(client("b")).unwrap(), &db.main()));
    assert!(Arc::ptr_eq(&db.partition(PartitionId::MULTIHOME).unwrap(), &db.main()));
    assert_eq!(db.tracked_clients(), 1);
}

#[test]
fn test_partitions_snapshot() {
    let db = segmentor();
    let a = db.resolve(Some(client("a"))).unwrap();
    let b = db.resolve(Some(client("b"))).unwrap();

    let ids: Vec<PartitionId> = db.partitions().iter().map(|p| p.id()).collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(&ids[..3], &[PartitionId::MAIN, PartitionId::MULTIHOME, PartitionId::EXPLORATORY]);
    assert!(ids.contains(&a.id()));
    assert!(ids.contains(&b.id()));

    db.remove_client(&Hash::digest("b"));
    assert_eq!(db.partitions().len(), 4);

    db.set_isolation_enabled(false);
    let collapsed = db.partitions();
    assert_eq!(collapsed.len(), 1);
    assert!(Arc::ptr_eq(&collapsed[0], &db.main()));
}

#[test]
fn test_stats_follow_isolation_switch() {
    let db = segmentor();
    db.resolve(Some(client("a"))).unwrap();
    assert_eq!(db.stats().client_partitions, 1);

    db.set_isolation_enabled(false);
    let stats = db.stats();
    assert!(!stats.isolation_enabled);
    assert_eq!(stats.client_partitions, db.client_ids().len());
    assert_eq!(stats.client_partitions, 0);

    db.set_isolation_enabled(true);
    assert_eq!(db.stats().client_partitions, 1);
}

#[test]
fn test_isolation_disabled_collapses_to_main() {
    let config = SegmentorConfig::default().with_isolation(false);
    let factory = Arc::new(MemoryStoreFactory::new());
    let db = Segmentor::new(config, factory.clone()).unwrap();

    let main = db.main();
    assert!(Arc::ptr_eq(&db.resolve(Some(client("anyone"))).unwrap(), &main));
    assert!(Arc::ptr_eq(&db.client_partition(Some(client("anyone"))).unwrap(), &main));
    assert!(Arc::ptr_eq(&db.multihome(), &main));
    assert!(Arc::ptr_eq(&db.resolve(Some(PartitionId::MULTIHOME)).unwrap(), &main));
    assert_eq!(factory.built_count(), 3);
    assert_eq!(db.tracked_clients(), 0);
}

#[test]
fn test_isolation_toggle_keeps_existing_partitions() {
    let db = segmentor();
    let key = Hash::digest("kept");
    let lease = LeaseRecord::new(key);
    let before = db.resolve(Some(client("a"))).unwrap();
    before.store(key, lease.clone()).unwrap();

    db.set_isolation_enabled(false);
    assert!(Arc::ptr_eq(&db.resolve(Some(client("a"))).unwrap(), &db.main()));
    assert!(Arc::ptr_eq(&db.multihome(), &db.main()));
    assert_eq!(db.tracked_clients(), 1);

    db.set_isolation_enabled(true);
    let after = db.resolve(Some(client("a"))).unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.lookup_lease_locally(&key), Some(lease));
    assert!(!Arc::ptr_eq(&db.multihome(), &db.main()));
}

#[test]
fn test_isolation_disabled_aggregates_are_main_only() {
    let db = segmentor();
    let client_router = PeerDescriptor::new(Hash::digest("client-router"), false);
    db.resolve(Some(client("a")))
        .unwrap()
        .store(client_router.identity, client_router.clone())
        .unwrap();
    let main_router = PeerDescriptor::new(Hash::digest("main-router"), false);
    db.main().store(main_router.identity, main_router.clone()).unwrap();

    db.set_isolation_enabled(false);
    let routers = db.all_routers();
    assert_eq!(routers.len(), 1);
    assert!(routers.contains(&main_router));
    assert_eq!(db.all_routers_known_to_clients(), routers);
    assert!(db.client_ids().is_empty());

    db.set_isolation_enabled(true);
    assert!(db.all_routers().contains(&client_router));
}
