//! Subclass-specific objects owned by a CDC interface
//!
//! An interface may carry one extension payload whose concrete type depends
//! on its subclass (for ACM: line coding and control line state). Payloads
//! are stored as `Box<dyn SubclassObject>` and recovered by downcasting.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;

use super::class::{CdcSubclass, CommSubclass};

/// Subclass-specific payload attached to an interface
pub trait SubclassObject: Any + Send + Sync + Debug {
    /// Short name used in logs and status snapshots
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn SubclassObject {
    pub fn downcast_ref<T: SubclassObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: SubclassObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: SubclassObject>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Stop bits (`bCharFormat`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

/// Parity (`bParityType`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

/// ACM line coding (SET_LINE_CODING / GET_LINE_CODING)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCoding {
    /// Data terminal rate in bits per second
    pub bit_rate: u32,
    pub stop_bits: StopBits,
    pub parity: Parity,
    /// 5, 6, 7, 8 or 16
    pub data_bits: u8,
}

impl Default for LineCoding {
    fn default() -> Self {
        Self {
            bit_rate: 115_200,
            stop_bits: StopBits::One,
            parity: Parity::None,
            data_bits: 8,
        }
    }
}

/// State of an Abstract Control Model interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcmState {
    line_coding: LineCoding,
    dtr: bool,
    rts: bool,
}

impl AcmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_coding(&self) -> &LineCoding {
        &self.line_coding
    }

    pub fn set_line_coding(&mut self, coding: LineCoding) {
        self.line_coding = coding;
    }

    /// Data Terminal Ready
    pub fn dtr(&self) -> bool {
        self.dtr
    }

    /// Request To Send
    pub fn rts(&self) -> bool {
        self.rts
    }

    /// SET_CONTROL_LINE_STATE
    pub fn set_control_line_state(&mut self, dtr: bool, rts: bool) {
        self.dtr = dtr;
        self.rts = rts;
    }
}

impl SubclassObject for AcmState {
    fn name(&self) -> &str {
        "acm"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Default payload for a freshly initialized interface of the given subclass
pub fn default_object(subclass: &CdcSubclass) -> Option<Box<dyn SubclassObject>> {
    match subclass {
        CdcSubclass::Communications(CommSubclass::AbstractControl) => {
            Some(Box::new(AcmState::new()))
        }
        _ => None,
    }
}
