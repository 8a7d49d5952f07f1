// tests/integration/test_helpers.rs

//! Test harness wiring a `LocalCoordStore` + `InMemoryCatalog` +
//! `SimulatedRegionServer` together behind an `AssignmentManager`, grounded
//! on the teacher's `TestContext` (`tests/integration/test_helpers.rs`).

use region_assign::core::assignment::manager::AssignmentConfig;
use region_assign::core::assignment::AssignmentManager;
use region_assign::core::catalog::InMemoryCatalog;
use region_assign::core::coordstore::LocalCoordStore;
use region_assign::core::region::ServerName;
use region_assign::core::rpc::SimulatedRegionServer;
use std::sync::Arc;
use std::time::Duration;

pub struct AssignTestContext {
    pub catalog: Arc<InMemoryCatalog>,
    pub manager: Arc<AssignmentManager>,
}

impl AssignTestContext {
    /// Short timeouts so timeout-driven scenarios run in well under a second.
    pub fn fast_config() -> AssignmentConfig {
        AssignmentConfig {
            opening_timeout: Duration::from_millis(150),
            closing_timeout: Duration::from_millis(150),
            offline_timeout: Duration::from_millis(80),
            min_servers_to_start: 1,
            fresh_start_timeout: Duration::from_millis(80),
        }
    }

    pub fn new(config: AssignmentConfig) -> Self {
        let coord = Arc::new(LocalCoordStore::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let rpc = Arc::new(SimulatedRegionServer::new(coord.clone(), catalog.clone()));
        let manager = Arc::new(AssignmentManager::new(
            coord.clone() as Arc<dyn region_assign::core::coordstore::CoordStore>,
            catalog.clone() as Arc<dyn region_assign::core::catalog::Catalog>,
            rpc.clone() as Arc<dyn region_assign::core::rpc::RegionServerRpc>,
            config,
        ));
        Self { catalog, manager }
    }

    pub fn with_live_servers(config: AssignmentConfig, servers: &[ServerName]) -> Self {
        let ctx = Self::new(config);
        for server in servers {
            ctx.manager.mark_server_live(server.clone());
        }
        ctx
    }
}

pub fn server(n: u16) -> ServerName {
    ServerName::new("10.0.0.1", 60000 + n, 1)
}
