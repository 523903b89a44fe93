//! Data models: configuration, invoice records and tax identifiers.

pub mod config;
pub mod record;
pub mod tax_id;
