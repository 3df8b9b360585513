//! Adapters implementing the domain ports.

pub mod file;
pub mod graphql;
pub mod in_memory;
pub mod retry;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
