//! netdb-core: Core types for the segmented network database
//!
//! A router hosting several anonymous client destinations must not let one
//! shared routing table tie those clients to each other or to its own floodfill
//! activity. The database is therefore split into isolated partitions:
//!
//! - Main: the router's own view of the network
//! - Multihome: lease records for our own destinations sent back by floodfills
//! - Exploratory: entries not yet attributable to any client
//! - Client: one partition per locally hosted destination, created on demand
//!
//! This crate holds the identifiers, record types and configuration shared by
//! the segmentor and its callers.

mod config;
mod error;
mod hash;
mod partition_id;
mod records;

pub use config::SegmentorConfig;
pub use error::Error;
pub use hash::{Hash, SigningPublicKey, HASH_LEN};
pub use partition_id::{PartitionId, WellKnown};
pub use records::{BlindData, DatabaseEntry, Lease, LeaseRecord, PeerDescriptor};

pub type Result<T> = std::result::Result<T, Error>;

/// Constants for partition seeding
pub mod constants {
    /// Floodfill descriptors copied into a new client partition by default
    pub const DEFAULT_SEED_PEERS: usize = 8;

    /// Upper bound accepted for the seed sample size
    pub const MAX_SEED_PEERS: usize = 64;
}
