//! CDC lifecycle event types

use serde::{Deserialize, Serialize};

use crate::cdc::{CdcSubclass, ClassKind};

/// Lifecycle event
///
/// Serialized as:
/// ```json
/// {
///   "event": "cdc.interface_initialized",
///   "data": { "itf": 0, "class_kind": "communications", "subclass": { ... } }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum CdcEvent {
    /// A slot went from empty to occupied
    #[serde(rename = "cdc.interface_initialized")]
    InterfaceInitialized {
        itf: usize,
        class_kind: ClassKind,
        subclass: CdcSubclass,
    },

    /// A slot was torn down; `class_kind` names the teardown path that ran
    #[serde(rename = "cdc.interface_deinitialized")]
    InterfaceDeinitialized { itf: usize, class_kind: ClassKind },

    /// A lifecycle operation was rejected
    #[serde(rename = "cdc.operation_failed")]
    OperationFailed {
        itf: usize,
        /// "init" or "deinit"
        operation: String,
        error: String,
    },
}

impl CdcEvent {
    /// Get the event name (for filtering/routing)
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::InterfaceInitialized { .. } => "cdc.interface_initialized",
            Self::InterfaceDeinitialized { .. } => "cdc.interface_deinitialized",
            Self::OperationFailed { .. } => "cdc.operation_failed",
        }
    }

    /// Interface number the event refers to
    pub fn itf(&self) -> usize {
        match self {
            Self::InterfaceInitialized { itf, .. }
            | Self::InterfaceDeinitialized { itf, .. }
            | Self::OperationFailed { itf, .. } => *itf,
        }
    }
}
