//! Segmentor metrics
//!
//! Privacy-safe: labels carry the partition kind only, never a client hash.

use metrics::{counter, gauge};

pub const OWNER_CLIENT: &str = "client";
pub const OWNER_MAIN: &str = "main";
pub const OWNER_MISS: &str = "miss";

pub fn record_partition_created(kind: &str) {
    counter!("netdb_partitions_created_total", "kind" => kind.to_string()).increment(1);
}

pub fn record_creation_race() {
    counter!("netdb_partition_creation_races_total").increment(1);
}

pub fn record_partition_torn_down(kind: &str) {
    counter!("netdb_partitions_torn_down_total", "kind" => kind.to_string()).increment(1);
}

pub fn set_client_partitions(count: usize) {
    gauge!("netdb_client_partitions").set(count as f64);
}

pub fn record_seeded_peers(count: usize) {
    counter!("netdb_seeded_peers_total").increment(count as u64);
}

pub fn record_seeding_skipped() {
    counter!("netdb_seeding_skipped_total").increment(1);
}

pub fn record_owner_lookup(outcome: &str) {
    counter!("netdb_owner_lookups_total", "outcome" => outcome.to_string()).increment(1);
}
