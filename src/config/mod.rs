//! Configuration schema and file-backed store

mod schema;
mod store;

pub use schema::{AppConfig, CdcInterfaceConfig, CdcStackConfig};
pub use store::{ConfigChange, ConfigStore};
