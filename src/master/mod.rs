// src/master/mod.rs

//! The Master process entry point (spec.md §4.I, `SPEC_FULL.md` §4.I):
//! wires the coord-store, catalog, RPC client, Assignment Manager, Event
//! Dispatcher, and balancer timer together, mirroring the teacher's
//! `warden::run`'s "build config -> build global state -> spawn one task
//! per responsibility -> join" shape.

mod metrics_server;

use crate::config::MasterConfig;
use crate::core::assignment::manager::AssignmentConfig;
use crate::core::assignment::AssignmentManager;
use crate::core::catalog::InMemoryCatalog;
use crate::core::coordstore::{CoordStore, LocalCoordStore};
use crate::core::dispatcher::{Dispatcher, Event};
use crate::core::paths;
use crate::core::region::{Region, ServerName, META_TABLE, ROOT_TABLE};
use crate::core::rpc::SimulatedRegionServer;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Runs the Master process to completion. Returns an error (causing the
/// process to exit non-zero) if the `/master` ephemeral lock is lost, per
/// spec.md §7's "Master yields its `/master` node and exits" policy.
pub async fn run(config: MasterConfig) -> Result<()> {
    let coord: Arc<dyn CoordStore> = Arc::new(LocalCoordStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let rpc = Arc::new(SimulatedRegionServer::new(coord.clone(), catalog.clone()));

    let master_session = coord.new_session();
    coord
        .create(paths::MASTER, Bytes::from_static(b"master"), Some(master_session))
        .await
        .map_err(|e| anyhow!("failed to acquire the /master lock: {e}"))?;
    let mut master_lock_lost = coord.watch_exists(paths::MASTER).await;

    let assignment_config = AssignmentConfig::from(&config);
    let manager = Arc::new(AssignmentManager::new(coord.clone(), catalog.clone(), rpc, assignment_config));

    seed_demo_table(&catalog, &manager, &config);
    seed_demo_servers(&manager, &config);

    let dispatcher = Dispatcher::new(1024);
    let sender = dispatcher.sender.clone();

    let mut tasks: JoinSet<Result<()>> = JoinSet::new();
    tasks.spawn(spawn_tick_timer(sender.clone(), config.balancer_tick_interval));
    tasks.spawn(metrics_server::run_metrics_server(
        config.bind_host.clone(),
        config.metrics_port,
    ));
    tasks.spawn({
        let manager = manager.clone();
        async move {
            manager.run_dispatcher(dispatcher.receiver).await;
            Ok(())
        }
    });

    run_bootstrap(&manager, &config).await?;

    tokio::select! {
        _ = &mut master_lock_lost => {
            Err(anyhow!("lost the /master coord-store lock; yielding mastership"))
        }
        res = tasks.join_next() => {
            match res {
                Some(Ok(Ok(()))) => Err(anyhow!("a master task completed unexpectedly")),
                Some(Ok(Err(e))) => Err(e),
                Some(Err(e)) => Err(anyhow!("a master task panicked: {e}")),
                None => Err(anyhow!("no master tasks were scheduled")),
            }
        }
    }
}

async fn run_bootstrap(manager: &Arc<AssignmentManager>, config: &MasterConfig) -> Result<()> {
    let fresh = manager.detect_fresh_start().await?;
    if fresh {
        info!("fresh cluster detected; running initial bulk assignment");
    }

    let root = Region::first(ROOT_TABLE, 1);
    let meta = Region::first(META_TABLE, 2);
    manager.register_region(root.clone());
    manager.register_region(meta.clone());

    let user_regions = demo_regions(&config.demo_table_name, config.demo_region_count);
    for region in &user_regions {
        manager.register_region(region.clone());
    }

    manager.initial_bulk_assign(root, meta, user_regions).await?;
    info!(
        servers = manager.live_server_count(),
        "bootstrap complete; handing off to the event dispatcher"
    );
    Ok(())
}

fn seed_demo_table(catalog: &Arc<InMemoryCatalog>, manager: &Arc<AssignmentManager>, config: &MasterConfig) {
    for region in demo_regions(&config.demo_table_name, config.demo_region_count) {
        catalog.seed_region(region.clone());
        manager.register_region(region);
    }
}

/// Registers demo RegionServers as "live" (standing in for the `/rs/*`
/// ephemeral nodes a real deployment's RegionServers would create),
/// mirroring spec.md §6's RegionServer-side presence contract.
fn seed_demo_servers(manager: &Arc<AssignmentManager>, config: &MasterConfig) {
    for n in 0..3u16 {
        manager.mark_server_live(ServerName::new(config.bind_host.clone(), config.bind_port + n, 1));
    }
}

fn demo_regions(table: &str, count: usize) -> Vec<Region> {
    (0..count as i64).map(|i| Region::first(table, 100 + i)).collect()
}

/// Periodic `Event::Tick` producer, driving the Assignment Manager's timeout
/// scan. Balancer-move proposals are logged but not yet enacted onto the
/// dispatcher (spec.md §4.D's balancer stays advisory per `SPEC_FULL.md`'s
/// Open Question decision).
async fn spawn_tick_timer(sender: tokio::sync::mpsc::Sender<Event>, interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if sender.send(Event::Tick).await.is_err() {
            warn!("dispatcher channel closed; stopping tick timer");
            return Ok(());
        }
    }
}

