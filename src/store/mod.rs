//! Backing stores for rate records.

mod backend;
mod memory;

pub use backend::{RateStore, StoreError};
pub use memory::MemoryRateStore;
