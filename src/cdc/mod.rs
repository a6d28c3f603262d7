//! USB CDC interface slot management
//!
//! This module tracks which CDC interfaces of a USB device are active:
//! - Communications interfaces (ACM, ECM, NCM, ...)
//! - Data interfaces
//!
//! Architecture:
//! ```text
//! CdcService (shared async access)
//!     └── CdcSlotTable (per-slot state machine + validation gate)
//!             ├── EndpointAllocator (endpoint budget)
//!             └── CdcInterface (class, subclass, subclass object)
//! ```
//!
//! Endpoint transport, enumeration and descriptor negotiation belong to the
//! USB stack; it only associates and disassociates interfaces here.

pub mod class;
pub mod endpoint;
pub mod interface;
pub mod object;
pub mod service;
pub mod table;

pub use class::{CdcSubclass, ClassKind, CommSubclass, DataSubclass};
pub use endpoint::{EndpointAllocator, DEFAULT_MAX_ENDPOINTS};
pub use interface::{CdcConfig, CdcInterface, CdcInterfaceInfo, UsbDevHandle};
pub use object::{AcmState, LineCoding, Parity, StopBits, SubclassObject};
pub use service::{CdcService, CdcServiceState};
pub use table::{CdcSlotTable, CDC_INTF_NUM, MAX_SUPPORTED_ITF};
