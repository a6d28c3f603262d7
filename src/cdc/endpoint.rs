//! Endpoint budget shared by all CDC interfaces of a device
//!
//! EP0 belongs to the USB stack and is never counted. Every active CDC
//! interface holds the endpoints of its class until it is de-initialized:
//!
//! | Class          | Endpoints                 |
//! |----------------|---------------------------|
//! | Communications | 1 (notification IN)       |
//! | Data           | 2 (bulk IN + bulk OUT)    |

use super::class::ClassKind;
use crate::error::{CdcError, Result};

/// Non-control endpoints left to CDC on a full-speed device controller
pub const DEFAULT_MAX_ENDPOINTS: u8 = 6;

/// Endpoints held by the CDC interfaces of one device
#[derive(Debug, Clone)]
pub struct EndpointAllocator {
    max_endpoints: u8,
    used_endpoints: u8,
}

impl EndpointAllocator {
    pub fn new(max_endpoints: u8) -> Self {
        Self {
            max_endpoints,
            used_endpoints: 0,
        }
    }

    /// Reserve the endpoints an interface of `kind` needs
    ///
    /// Nothing is reserved on failure.
    pub fn reserve(&mut self, kind: ClassKind) -> Result<()> {
        let needed = kind.endpoints();
        if !self.can_reserve(kind) {
            return Err(CdcError::AllocationFailure(format!(
                "CDC {} interface needs {} endpoint(s), {} of {} left",
                kind.description(),
                needed,
                self.available(),
                self.max_endpoints
            )));
        }
        self.used_endpoints += needed;
        Ok(())
    }

    /// Hand back the endpoints of a de-initialized `kind` interface
    pub fn release(&mut self, kind: ClassKind) {
        self.used_endpoints = self.used_endpoints.saturating_sub(kind.endpoints());
    }

    pub fn available(&self) -> u8 {
        self.max_endpoints.saturating_sub(self.used_endpoints)
    }

    pub fn used(&self) -> u8 {
        self.used_endpoints
    }

    pub fn max(&self) -> u8 {
        self.max_endpoints
    }

    pub fn can_reserve(&self, kind: ClassKind) -> bool {
        self.available() >= kind.endpoints()
    }
}

impl Default for EndpointAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENDPOINTS)
    }
}
