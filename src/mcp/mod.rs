//! MCP (Model Context Protocol) server over stdio, using rmcp.
//!
//! Exposes the read pass and the update service as tools so that an MCP
//! client can list available updates and apply them.

mod handlers;
mod server;
mod tools;
pub mod types;

pub use handlers::run_mcp_server;
pub use server::PkgStoreMcpServer;
