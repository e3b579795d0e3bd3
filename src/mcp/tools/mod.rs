//! MCP tool implementations.

mod common;
mod updates;

pub use updates::{list_updates, update_packages, update_supported};
