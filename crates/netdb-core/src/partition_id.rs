//! Partition identifiers for the segmented network database

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Hash;

/// The three process-lifetime partitions every router has
///
/// - Main: the router's own view, used for floodfill participation and for
///   direct interaction with other routers
/// - Multihome: holds lease records for our own destinations that floodfills
///   send back to us, so we can answer for them regardless of routing distance
/// - Exploratory: default home for entries not yet attributable to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellKnown {
    Main,
    Multihome,
    Exploratory,
}

impl WellKnown {
    pub const ALL: [WellKnown; 3] = [WellKnown::Main, WellKnown::Multihome, WellKnown::Exploratory];

    pub fn as_str(&self) -> &'static str {
        match self {
            WellKnown::Main => "main",
            WellKnown::Multihome => "multihome",
            WellKnown::Exploratory => "exploratory",
        }
    }
}

impl fmt::Display for WellKnown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one sub-database
///
/// Client partitions are keyed by the hash of a locally hosted destination.
/// Equality is structural, so two ids built from the same hash always name the
/// same partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionId {
    WellKnown(WellKnown),
    Client(Hash),
}

impl PartitionId {
    pub const MAIN: PartitionId = PartitionId::WellKnown(WellKnown::Main);
    pub const MULTIHOME: PartitionId = PartitionId::WellKnown(WellKnown::Multihome);
    pub const EXPLORATORY: PartitionId = PartitionId::WellKnown(WellKnown::Exploratory);

    pub fn client(hash: Hash) -> Self {
        PartitionId::Client(hash)
    }

    pub fn is_client(&self) -> bool {
        matches!(self, PartitionId::Client(_))
    }

    /// Destination hash for client partitions
    pub fn client_hash(&self) -> Option<&Hash> {
        match self {
            PartitionId::Client(hash) => Some(hash),
            PartitionId::WellKnown(_) => None,
        }
    }

    /// Metric label; never includes the client hash
    pub fn kind(&self) -> &'static str {
        match self {
            PartitionId::WellKnown(wk) => wk.as_str(),
            PartitionId::Client(_) => "client",
        }
    }
}

impl From<WellKnown> for PartitionId {
    fn from(wk: WellKnown) -> Self {
        PartitionId::WellKnown(wk)
    }
}

impl From<Hash> for PartitionId {
    fn from(hash: Hash) -> Self {
        PartitionId::Client(hash)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionId::WellKnown(wk) => write!(f, "{}", wk),
            PartitionId::Client(hash) => write!(f, "client:{}", hash.short()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ids_compare_structurally() {
        let a = PartitionId::client(Hash::digest("alice"));
        let b = PartitionId::from(Hash::digest("alice"));
        assert_eq!(a, b);
        assert_ne!(a, PartitionId::client(Hash::digest("bob")));
        assert_ne!(a, PartitionId::MAIN);
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(PartitionId::MAIN.kind(), "main");
        assert_eq!(PartitionId::MULTIHOME.kind(), "multihome");
        assert_eq!(PartitionId::EXPLORATORY.kind(), "exploratory");
        assert_eq!(PartitionId::client(Hash::digest("x")).kind(), "client");
    }

    #[test]
    fn test_display() {
        assert_eq!(PartitionId::MAIN.to_string(), "main");
        let id = PartitionId::client(Hash::new([0xcd; 32]));
        assert_eq!(id.to_string(), "client:cdcdcdcd");
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&PartitionId::EXPLORATORY).unwrap(),
            "{\"well_known\":\"exploratory\"}"
        );
        let id = PartitionId::client(Hash::digest("alice"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<PartitionId>(&json).unwrap(), id);
    }

    #[test]
    fn test_client_hash() {
        let hash = Hash::digest("alice");
        assert_eq!(PartitionId::client(hash).client_hash(), Some(&hash));
        assert_eq!(PartitionId::MAIN.client_hash(), None);
        assert!(!PartitionId::MAIN.is_client());
    }
}
