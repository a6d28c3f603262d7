//! usb-cdc-slots - CDC interface lifecycle for an embedded USB device stack
//!
//! This crate owns the table of CDC interface slots and enforces the rules
//! for initializing and tearing them down.

pub mod cdc;
pub mod config;
pub mod error;
pub mod events;

pub use error::{CdcError, Result};
