//! Segmentor configuration

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SEED_PEERS, MAX_SEED_PEERS};
use crate::Error;

/// Configuration for the segmented network database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentorConfig {
    /// Give each client destination its own partition.
    /// When false every resolution collapses onto the main partition.
    #[serde(default = "default_isolation")]
    pub isolation_enabled: bool,
    /// Number of floodfill descriptors copied from main into a new client
    /// partition. Zero disables seeding.
    #[serde(default = "default_seed_peer_count")]
    pub seed_peer_count: usize,
}

fn default_isolation() -> bool {
    true
}

fn default_seed_peer_count() -> usize {
    DEFAULT_SEED_PEERS
}

impl SegmentorConfig {
    pub fn with_isolation(mut self, enabled: bool) -> Self {
        self.isolation_enabled = enabled;
        self
    }

    pub fn with_seed_peer_count(mut self, count: usize) -> Self {
        self.seed_peer_count = count;
        self
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.seed_peer_count > MAX_SEED_PEERS {
            return Err(Error::InvalidConfig {
                field: "seed_peer_count".to_string(),
                reason: format!("{} exceeds maximum of {}", self.seed_peer_count, MAX_SEED_PEERS),
            });
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

impl Default for SegmentorConfig {
    fn default() -> Self {
        Self {
            isolation_enabled: default_isolation(),
            seed_peer_count: default_seed_peer_count(),
        }
    }
}
