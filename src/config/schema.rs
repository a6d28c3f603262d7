use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cdc::{
    CdcConfig, ClassKind, CommSubclass, UsbDevHandle, DEFAULT_MAX_ENDPOINTS,
};
use crate::error::{CdcError, Result};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CDC interface settings
    pub cdc: CdcStackConfig,
    /// Log filter override (e.g., "debug"); CLI and RUST_LOG take precedence
    pub log_level: Option<String>,
}

/// CDC stack configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdcStackConfig {
    /// Endpoints (besides EP0) available to CDC interfaces
    pub max_endpoints: u8,
    /// Interfaces to set up at startup
    pub interfaces: Vec<CdcInterfaceConfig>,
}

impl Default for CdcStackConfig {
    fn default() -> Self {
        Self {
            max_endpoints: DEFAULT_MAX_ENDPOINTS,
            interfaces: vec![CdcInterfaceConfig::default()],
        }
    }
}

impl CdcStackConfig {
    /// Check every interface entry and reject duplicate interface numbers
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.interfaces.len());
        for entry in &self.interfaces {
            entry.to_cdc_config()?;
            if !seen.insert(entry.itf) {
                return Err(CdcError::Config(format!(
                    "CDC interface {} configured more than once",
                    entry.itf
                )));
            }
        }
        Ok(())
    }
}

/// One CDC interface entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdcInterfaceConfig {
    /// Interface number
    pub itf: usize,
    /// Whether to set the interface up at startup
    pub enabled: bool,
    /// USB device index
    pub usb_dev: u8,
    /// CDC class
    pub class: ClassKind,
    /// Communications subclass (ACM when left out); must be absent for Data
    pub comm_subclass: Option<CommSubclass>,
}

impl Default for CdcInterfaceConfig {
    fn default() -> Self {
        Self {
            itf: 0,
            enabled: true,
            usb_dev: 0,
            class: ClassKind::Communications,
            comm_subclass: None,
        }
    }
}

impl CdcInterfaceConfig {
    /// Convert to the config consumed by `init`
    pub fn to_cdc_config(&self) -> Result<CdcConfig> {
        let usb_dev = UsbDevHandle(self.usb_dev);
        match (self.class, self.comm_subclass) {
            (ClassKind::Communications, subclass) => Ok(CdcConfig::comm(
                usb_dev,
                subclass.unwrap_or(CommSubclass::AbstractControl),
            )),
            (ClassKind::Data, None) => Ok(CdcConfig::data(usb_dev)),
            (ClassKind::Data, Some(_)) => Err(CdcError::Config(format!(
                "CDC interface {}: data class does not take comm_subclass",
                self.itf
            ))),
        }
    }
}
