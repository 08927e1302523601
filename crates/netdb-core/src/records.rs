//! Database entries: peer descriptors, lease records and blinding data
//!
//! These are structural stand-ins for the signed records a partition store
//! persists. Signature validation and the wire encoding belong to the store.

use serde::{Deserialize, Serialize};

use crate::{Hash, SigningPublicKey};

/// Descriptor of a router on the network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerDescriptor {
    /// Router identity hash
    pub identity: Hash,
    /// Published transport addresses
    pub addresses: Vec<String>,
    /// Whether the router participates in floodfill replication
    pub floodfill: bool,
    /// Publication time (Unix milliseconds)
    pub published: u64,
}

impl PeerDescriptor {
    pub fn new(identity: Hash, floodfill: bool) -> Self {
        Self {
            identity,
            addresses: Vec::new(),
            floodfill,
            published: 0,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.addresses.push(address.into());
        self
    }
}

/// One inbound gateway of a destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lease {
    /// Gateway router identity
    pub gateway: Hash,
    /// Tunnel id at the gateway
    pub tunnel_id: u32,
    /// Expiration (Unix milliseconds)
    pub expires: u64,
}

/// Reachability record of a destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseRecord {
    /// Destination hash this record is stored under
    pub key: Hash,
    /// Signing key of the destination, if known
    pub signing_key: Option<SigningPublicKey>,
    /// Current inbound gateways
    pub leases: Vec<Lease>,
    /// Publication time (Unix milliseconds)
    pub published: u64,
}

impl LeaseRecord {
    pub fn new(key: Hash) -> Self {
        Self {
            key,
            signing_key: None,
            leases: Vec::new(),
            published: 0,
        }
    }

    pub fn with_lease(mut self, gateway: Hash, tunnel_id: u32, expires: u64) -> Self {
        self.leases.push(Lease {
            gateway,
            tunnel_id,
            expires,
        });
        self
    }

    pub fn with_signing_key(mut self, key: SigningPublicKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Latest lease expiration, or 0 when there are no leases
    pub fn latest_expiration(&self) -> u64 {
        self.leases.iter().map(|l| l.expires).max().unwrap_or(0)
    }
}

/// Blinding parameters for an encrypted or blinded destination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlindData {
    /// Unblinded signing key
    pub signing_key: SigningPublicKey,
    /// Destination hash, once known
    pub destination: Option<Hash>,
    /// Per-client authentication secret, if any
    pub secret: Option<String>,
}

impl BlindData {
    pub fn new(signing_key: SigningPublicKey) -> Self {
        Self {
            signing_key,
            destination: None,
            secret: None,
        }
    }

    pub fn with_destination(mut self, destination: Hash) -> Self {
        self.destination = Some(destination);
        self
    }
}

/// Either kind of record a partition stores
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseEntry {
    Router(PeerDescriptor),
    Lease(LeaseRecord),
}

impl DatabaseEntry {
    /// Key the entry is naturally stored under
    pub fn key(&self) -> Hash {
        match self {
            DatabaseEntry::Router(ri) => ri.identity,
            DatabaseEntry::Lease(ls) => ls.key,
        }
    }

    pub fn into_lease(self) -> Option<LeaseRecord> {
        match self {
            DatabaseEntry::Lease(ls) => Some(ls),
            DatabaseEntry::Router(_) => None,
        }
    }

    pub fn is_lease(&self) -> bool {
        matches!(self, DatabaseEntry::Lease(_))
    }
}

impl From<PeerDescriptor> for DatabaseEntry {
    fn from(ri: PeerDescriptor) -> Self {
        DatabaseEntry::Router(ri)
    }
}

impl From<LeaseRecord> for DatabaseEntry {
    fn from(ls: LeaseRecord) -> Self {
        DatabaseEntry::Lease(ls)
    }
}
