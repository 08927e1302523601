//! Segmentor demo binary
//!
//! Builds a segmented database over in-memory stores, populates the main
//! partition with synthetic floodfills, creates client partitions and prints
//! the resulting stats.
//!
//! Run with:
//! ```bash
//! cargo run -p netdb-segmentor --bin segmentor-demo -- --clients 4 --floodfills 32
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use netdb_core::{Hash, LeaseRecord, PartitionId, PeerDescriptor, SegmentorConfig};
use netdb_segmentor::{MemoryStoreFactory, SegmentedDatabase, Segmentor};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "segmentor-demo")]
#[command(about = "Exercise the segmented network database with in-memory stores")]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of client destinations to create partitions for
    #[arg(long, default_value = "3")]
    clients: usize,

    /// Number of synthetic floodfill routers in the main partition
    #[arg(long, default_value = "16")]
    floodfills: usize,

    /// Collapse every partition onto main
    #[arg(long)]
    no_isolation: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("netdb_segmentor=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SegmentorConfig::load(path)?,
        None => SegmentorConfig::default(),
    };
    if args.no_isolation {
        config.isolation_enabled = false;
    }

    let factory = Arc::new(MemoryStoreFactory::new());
    let segmentor = Segmentor::new(config, factory)?;

    let main = segmentor.main();
    for i in 0..args.floodfills {
        let ri = PeerDescriptor::new(Hash::digest(format!("floodfill-{}", i)), true)
            .with_address(format!("10.0.{}.{}:7654", i / 256, i % 256));
        main.store(ri.identity, ri)?;
    }

    for i in 0..args.clients {
        let destination = Hash::digest(format!("client-{}", i));
        let partition = segmentor.client_partition(Some(PartitionId::client(destination)))?;
        let lease = LeaseRecord::new(destination).with_lease(Hash::digest(format!("gateway-{}", i)), i as u32, 600_000);
        partition.store(destination, lease)?;
        info!(
            partition = %partition.id(),
            floodfills = partition.known_floodfill_peers().len(),
            "Client partition ready"
        );
    }

    let probe = Hash::digest("client-0");
    info!(
        found = segmentor.lookup_lease_by_owner_unknown(&probe).is_some(),
        owner = ?segmentor.owner_of(&probe),
        "Owner-unknown lookup"
    );

    println!("{}", serde_json::to_string_pretty(&segmentor.stats())?);

    segmentor.shutdown();
    Ok(())
}
