//! Data models
//!
//! Mirrors of the backend's response bodies. Field names follow the Rust
//! side; serde renames map them onto the backend's wire names.

pub mod dining_table;
pub mod menu_item;
pub mod order;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
