//! MCP tool parameter types.
//!
//! Used with rmcp's `Parameters<T>` wrapper for deserialization and JSON
//! schema generation.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for the list_updates tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListUpdatesArgs {
    /// Stop after this many repositories with updates
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for the update_packages tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdatePackagesArgs {
    /// Import path pattern to update, e.g. "github.com/owner/repo/..."
    pub import_path_pattern: String,
}

/// Parameters for the update_supported tool (no arguments needed)
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateSupportedArgs {}
