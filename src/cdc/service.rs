//! CDC Service - shared access to the slot table
//!
//! The slot table itself assumes a single caller. `CdcService` keeps that
//! invariant for concurrent users by serializing every operation through
//! one async mutex.
//!
//! ```text
//!   USB stack task ──┐
//!   control plane ───┼──▶ CdcService ──▶ Mutex<CdcSlotTable> ──▶ EventBus
//!   status dump ─────┘
//! ```

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::endpoint::DEFAULT_MAX_ENDPOINTS;
use super::interface::{CdcConfig, CdcInterface, CdcInterfaceInfo};
use super::table::CdcSlotTable;
use crate::config::CdcStackConfig;
use crate::error::Result;
use crate::events::EventBus;

/// Snapshot of the service
#[derive(Debug, Clone, Default, Serialize)]
pub struct CdcServiceState {
    /// Occupied slots
    pub interfaces: Vec<CdcInterfaceInfo>,
    /// Endpoints reserved by active interfaces
    pub endpoints_used: u8,
    /// Endpoint budget
    pub endpoints_max: u8,
}

/// CDC Service - serialized access to one slot table
pub struct CdcService {
    table: Mutex<CdcSlotTable>,
    events: Arc<EventBus>,
}

impl CdcService {
    /// Create a new service with the default endpoint budget
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_MAX_ENDPOINTS)
    }

    /// Create a new service with a custom endpoint budget
    pub fn with_endpoints(max_endpoints: u8) -> Self {
        let events = Arc::new(EventBus::new());
        let table: CdcSlotTable =
            CdcSlotTable::with_endpoints(max_endpoints).with_event_bus(events.clone());
        Self {
            table: Mutex::new(table),
            events,
        }
    }

    /// Create a service sized from configuration (interfaces are not applied)
    pub fn from_config(config: &CdcStackConfig) -> Self {
        Self::with_endpoints(config.max_endpoints)
    }

    /// Event bus carrying lifecycle events of this service
    pub fn event_bus(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub async fn init(&self, itf: usize, config: &CdcConfig) -> Result<()> {
        self.table.lock().await.init(itf, config)
    }

    pub async fn deinit(&self, itf: usize) -> Result<()> {
        self.table.lock().await.deinit(itf)
    }

    pub async fn is_initialized(&self, itf: usize) -> bool {
        self.table.lock().await.is_initialized(itf)
    }

    /// Snapshot of the interface at `itf`, or `None` if the slot is empty
    pub async fn interface_info(&self, itf: usize) -> Option<CdcInterfaceInfo> {
        let table = self.table.lock().await;
        table.get_intf(itf).map(|intf| intf.info(itf))
    }

    /// Run `f` against the interface at `itf` while holding the table lock
    pub async fn with_interface<F, R>(&self, itf: usize, f: F) -> Option<R>
    where
        F: FnOnce(&CdcInterface) -> R,
    {
        let table = self.table.lock().await;
        table.get_intf(itf).map(f)
    }

    /// Mutable variant of [`with_interface`](Self::with_interface)
    pub async fn with_interface_mut<F, R>(&self, itf: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut CdcInterface) -> R,
    {
        let mut table = self.table.lock().await;
        table.get_intf_mut(itf).map(f)
    }

    /// Initialize every enabled interface from configuration
    ///
    /// Stops at the first failure; interfaces set up before it stay up.
    pub async fn apply_config(&self, config: &CdcStackConfig) -> Result<()> {
        config.validate()?;

        let mut table = self.table.lock().await;
        for entry in config.interfaces.iter().filter(|e| e.enabled) {
            let cdc_config = entry.to_cdc_config()?;
            table.init(entry.itf, &cdc_config)?;
            info!(
                "CDC interface {} initialized: {}",
                entry.itf,
                cdc_config.subclass.description()
            );
        }
        Ok(())
    }

    /// Get current service state
    pub async fn state(&self) -> CdcServiceState {
        let table = self.table.lock().await;
        let (endpoints_used, endpoints_max) = table.endpoint_info();
        CdcServiceState {
            interfaces: table.iter().map(|(itf, intf)| intf.info(itf)).collect(),
            endpoints_used,
            endpoints_max,
        }
    }

    /// Tear down every occupied slot
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down CDC service");

        let mut table = self.table.lock().await;
        for itf in table.initialized_interfaces() {
            if let Err(e) = table.deinit(itf) {
                warn!("Error de-initializing CDC interface {}: {}", itf, e);
            }
        }

        info!("CDC service shutdown complete");
        Ok(())
    }
}

impl Default for CdcService {
    fn default() -> Self {
        Self::new()
    }
}
