//! CDC class and subclass codes (CDC v1.20)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CdcError, Result};

/// USB class code of a CDC Communications interface (`TUSB_CLASS_CDC`)
pub const USB_CLASS_CDC: u8 = 0x02;

/// USB class code of a CDC Data interface (`TUSB_CLASS_CDC_DATA`)
pub const USB_CLASS_CDC_DATA: u8 = 0x0A;

/// Top-level CDC class implemented by an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    /// Communications interface (control, notifications)
    Communications,
    /// Data interface (bulk payload)
    Data,
}

impl ClassKind {
    /// Parse a USB interface class code
    pub fn from_class_code(code: u8) -> Result<Self> {
        match code {
            USB_CLASS_CDC => Ok(ClassKind::Communications),
            USB_CLASS_CDC_DATA => Ok(ClassKind::Data),
            other => Err(CdcError::InvalidArgument(format!(
                "Unknown CDC class code 0x{:02x}",
                other
            ))),
        }
    }

    /// Get USB interface class code
    pub fn class_code(&self) -> u8 {
        match self {
            ClassKind::Communications => USB_CLASS_CDC,
            ClassKind::Data => USB_CLASS_CDC_DATA,
        }
    }

    /// Get number of endpoints an interface of this class occupies
    ///
    /// Communications: notification IN. Data: bulk IN + bulk OUT.
    pub fn endpoints(&self) -> u8 {
        match self {
            ClassKind::Communications => 1,
            ClassKind::Data => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ClassKind::Communications => "Communications",
            ClassKind::Data => "Data",
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.description(), self.class_code())
    }
}

/// Communications class subclass codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommSubclass {
    DirectLineControl,
    /// Abstract Control Model (virtual serial port)
    AbstractControl,
    TelephoneControl,
    MultiChannelControl,
    CapiControl,
    /// Ethernet Control Model
    EthernetNetworking,
    AtmNetworking,
    WirelessHandset,
    DeviceManagement,
    MobileDirectLine,
    Obex,
    /// Ethernet Emulation Model
    EthernetEmulation,
    /// Network Control Model
    NetworkControl,
}

impl CommSubclass {
    pub fn from_code(code: u8) -> Result<Self> {
        let subclass = match code {
            0x01 => CommSubclass::DirectLineControl,
            0x02 => CommSubclass::AbstractControl,
            0x03 => CommSubclass::TelephoneControl,
            0x04 => CommSubclass::MultiChannelControl,
            0x05 => CommSubclass::CapiControl,
            0x06 => CommSubclass::EthernetNetworking,
            0x07 => CommSubclass::AtmNetworking,
            0x08 => CommSubclass::WirelessHandset,
            0x09 => CommSubclass::DeviceManagement,
            0x0A => CommSubclass::MobileDirectLine,
            0x0B => CommSubclass::Obex,
            0x0C => CommSubclass::EthernetEmulation,
            0x0D => CommSubclass::NetworkControl,
            other => {
                return Err(CdcError::InvalidArgument(format!(
                    "Unknown CDC communications subclass 0x{:02x}",
                    other
                )))
            }
        };
        Ok(subclass)
    }

    pub fn code(&self) -> u8 {
        match self {
            CommSubclass::DirectLineControl => 0x01,
            CommSubclass::AbstractControl => 0x02,
            CommSubclass::TelephoneControl => 0x03,
            CommSubclass::MultiChannelControl => 0x04,
            CommSubclass::CapiControl => 0x05,
            CommSubclass::EthernetNetworking => 0x06,
            CommSubclass::AtmNetworking => 0x07,
            CommSubclass::WirelessHandset => 0x08,
            CommSubclass::DeviceManagement => 0x09,
            CommSubclass::MobileDirectLine => 0x0A,
            CommSubclass::Obex => 0x0B,
            CommSubclass::EthernetEmulation => 0x0C,
            CommSubclass::NetworkControl => 0x0D,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommSubclass::DirectLineControl => "Direct Line Control Model",
            CommSubclass::AbstractControl => "Abstract Control Model",
            CommSubclass::TelephoneControl => "Telephone Control Model",
            CommSubclass::MultiChannelControl => "Multi-Channel Control Model",
            CommSubclass::CapiControl => "CAPI Control Model",
            CommSubclass::EthernetNetworking => "Ethernet Networking Control Model",
            CommSubclass::AtmNetworking => "ATM Networking Control Model",
            CommSubclass::WirelessHandset => "Wireless Handset Control Model",
            CommSubclass::DeviceManagement => "Device Management",
            CommSubclass::MobileDirectLine => "Mobile Direct Line Model",
            CommSubclass::Obex => "OBEX",
            CommSubclass::EthernetEmulation => "Ethernet Emulation Model",
            CommSubclass::NetworkControl => "Network Control Model",
        }
    }
}

/// Data class subclass codes (the Data class defines only one)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSubclass {
    #[default]
    Data,
}

impl DataSubclass {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(DataSubclass::Data),
            other => Err(CdcError::InvalidArgument(format!(
                "Unknown CDC data subclass 0x{:02x}",
                other
            ))),
        }
    }

    pub fn code(&self) -> u8 {
        0x00
    }
}

/// Subclass of a CDC interface, tagged by its class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "class", content = "subclass", rename_all = "lowercase")]
pub enum CdcSubclass {
    Communications(CommSubclass),
    Data(DataSubclass),
}

impl CdcSubclass {
    /// Build from raw USB class and subclass codes
    pub fn from_codes(class_code: u8, subclass_code: u8) -> Result<Self> {
        match ClassKind::from_class_code(class_code)? {
            ClassKind::Communications => Ok(CdcSubclass::Communications(
                CommSubclass::from_code(subclass_code)?,
            )),
            ClassKind::Data => Ok(CdcSubclass::Data(DataSubclass::from_code(subclass_code)?)),
        }
    }

    pub fn class_kind(&self) -> ClassKind {
        match self {
            CdcSubclass::Communications(_) => ClassKind::Communications,
            CdcSubclass::Data(_) => ClassKind::Data,
        }
    }

    pub fn class_code(&self) -> u8 {
        self.class_kind().class_code()
    }

    pub fn subclass_code(&self) -> u8 {
        match self {
            CdcSubclass::Communications(sub) => sub.code(),
            CdcSubclass::Data(sub) => sub.code(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CdcSubclass::Communications(sub) => sub.description(),
            CdcSubclass::Data(_) => "Data",
        }
    }
}
