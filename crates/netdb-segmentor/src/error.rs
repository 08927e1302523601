//! Segmentor error types

use netdb_core::PartitionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentorError {
    #[error("Store startup failed for {id}: {reason}")]
    StoreStartup { id: PartitionId, reason: String },

    #[error("Store for {0} is shut down")]
    StoreShutDown(PartitionId),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Segmentor is shut down")]
    Closed,

    #[error(transparent)]
    Core(#[from] netdb_core::Error),
}

pub type Result<T> = std::result::Result<T, SegmentorError>;
