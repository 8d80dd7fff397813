//! Storage implementations for restaurants and menus.
//!
//! Available backends:
//! - `MemoryMenuStore` - In-memory storage with JSON snapshots

pub mod memory;

pub use memory::MemoryMenuStore;
