//! Live-session capability
//!
//! Owner resolution asks this which client destinations currently have a live
//! session, instead of reaching back into the client manager.

use std::collections::HashSet;

use netdb_core::Hash;
use parking_lot::RwLock;

pub trait PartitionEnumerator: Send + Sync {
    fn is_live(&self, client: &Hash) -> bool;
}

impl<F> PartitionEnumerator for F
where
    F: Fn(&Hash) -> bool + Send + Sync,
{
    fn is_live(&self, client: &Hash) -> bool {
        self(client)
    }
}

/// Set of live client destinations, maintained by session code
#[derive(Debug, Default)]
pub struct LiveClients {
    live: RwLock<HashSet<Hash>>,
}

impl LiveClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, client: Hash) {
        self.live.write().insert(client);
    }

    pub fn remove(&self, client: &Hash) -> bool {
        self.live.write().remove(client)
    }

    pub fn len(&self) -> usize {
        self.live.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.read().is_empty()
    }
}

impl PartitionEnumerator for LiveClients {
    fn is_live(&self, client: &Hash) -> bool {
        self.live.read().contains(client)
    }
}
