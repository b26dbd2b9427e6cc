use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::{ListCache, MemoryCache, RedisCache};
use crate::config::{Config, StoreBackend};
use crate::db::{MemoryStore, NodeStore, PgStore, RestStore};
use crate::handlers::{self, NodeInfoInput};
use crate::models::{NewNode, NodeStatusReport, NodeUpdate};
use crate::services::{sync_node, NodeRegistry, NodeStatusAggregator};

/// POKT node operator dashboard
#[derive(Parser, Debug)]
#[command(name = "pokt-dash", about = "Monitor POKT nodes and keep a registry of them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Query a node's height, peers and info once
    Status {
        /// RPC base URL, defaults to POKT_NODE_URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Poll a node's status on an interval
    Watch {
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value = "30")]
        interval_secs: u64,
        /// Stop after this many reports
        #[arg(long)]
        count: Option<u64>,
    },
    /// List registered nodes, newest first
    List,
    Add {
        #[arg(long)]
        address: String,
    },
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        block_height: Option<i64>,
        #[arg(long)]
        peers: Option<i64>,
        #[arg(long)]
        uptime: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Poll a registered node and write its status back to the registry
    Sync {
        #[arg(long)]
        id: Uuid,
        /// RPC base URL, defaults to the node's address
        #[arg(long)]
        url: Option<String>,
    },
}

pub async fn build_registry(cfg: &Config) -> Result<NodeRegistry> {
    let store: Arc<dyn NodeStore> = match cfg.backend {
        StoreBackend::Rest => Arc::new(RestStore::new(cfg.store_config()?)),
        StoreBackend::Postgres => {
            let store = PgStore::connect(cfg.database_url()?)
                .await
                .context("connecting to postgres")?;
            store.ensure_schema().await.context("preparing nodes table")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; nothing outlives this process");
            Arc::new(MemoryStore::new())
        }
    };
    let cache: Arc<dyn ListCache> = match &cfg.redis_url {
        Some(url) => Arc::new(RedisCache::new(url, cfg.cache_ttl_secs).context("opening redis")?),
        None => Arc::new(MemoryCache::new()),
    };
    info!("Registry backed by {:?} store, collection '{}'", cfg.backend, store.collection());
    Ok(NodeRegistry::new(store, cache))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Polls `node_url` every `interval` and hands each report to `on_report`.
///
/// Stops after `count` reports or once `shutdown` resolves; a fetch still in
/// flight at that point is dropped. Returns the number of reports produced.
pub async fn watch_node<S, F>(
    aggregator: &NodeStatusAggregator,
    node_url: &str,
    interval: Duration,
    count: Option<u64>,
    shutdown: S,
    mut on_report: F,
) -> Result<u64>
where
    S: Future<Output = ()>,
    F: FnMut(&NodeStatusReport) -> Result<()>,
{
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(interval);
    let mut seen = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => break,
        }
        let report = tokio::select! {
            report = aggregator.get_node_status(node_url) => report,
            _ = &mut shutdown => break,
        };
        on_report(&report)?;
        seen += 1;
        if count.is_some_and(|c| seen >= c) {
            break;
        }
    }
    Ok(seen)
}

pub async fn run(cli: Cli, cfg: Config) -> Result<()> {
    let aggregator = NodeStatusAggregator::new();

    match cli.command {
        Commands::Status { url } => {
            let node_url = url.unwrap_or_else(|| cfg.node_url.clone());
            let report = handlers::node_info(&aggregator, NodeInfoInput { node_url }).await?;
            print_json(&report)?;
            if let Some(message) = &report.error_message {
                bail!("status check failed: {}", message);
            }
        }

        Commands::Watch { url, interval_secs, count } => {
            let node_url = url.unwrap_or_else(|| cfg.node_url.clone());
            handlers::validate_node_url(&node_url)?;
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Cannot listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            let interval = Duration::from_secs(interval_secs.max(1));
            let seen = watch_node(&aggregator, &node_url, interval, count, shutdown, |report| {
                print_json(report)
            })
            .await?;
            info!("Stopped watching {} after {} reports", node_url, seen);
        }

        Commands::List => {
            let registry = build_registry(&cfg).await?;
            print_json(&registry.list_nodes().await?)?;
        }

        Commands::Add { address } => {
            let registry = build_registry(&cfg).await?;
            let record = registry.create_node(&NewNode::with_address(address)).await?;
            print_json(&record)?;
        }

        Commands::Update { id, address, status, block_height, peers, uptime } => {
            let update = NodeUpdate {
                address,
                status,
                block_height,
                peer_count: peers,
                uptime,
            };
            if update.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let registry = build_registry(&cfg).await?;
            print_json(&registry.update_node(id, &update).await?)?;
        }

        Commands::Delete { id } => {
            let registry = build_registry(&cfg).await?;
            registry.delete_node(id).await?;
        }

        Commands::Sync { id, url } => {
            let registry = build_registry(&cfg).await?;
            let node_url = match url {
                Some(url) => url,
                None => registry
                    .list_nodes()
                    .await?
                    .into_iter()
                    .find(|n| n.id == id)
                    .map(|n| n.address)
                    .with_context(|| format!("node {} not found", id))?,
            };
            handlers::validate_node_url(&node_url)?;
            print_json(&sync_node(&registry, &aggregator, id, &node_url).await?)?;
        }
    }

    Ok(())
}
