//! Recheck-time stores.

mod file;
mod memory;

pub use file::JsonFileRecheckStore;
pub use memory::MemoryRecheckStore;
