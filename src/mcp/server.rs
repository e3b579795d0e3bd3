use std::sync::Arc;

use rmcp::{
    handler::server::router::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};

use super::tools;
use super::types::*;
use crate::app::App;

/// pkgstore MCP server
#[derive(Clone)]
pub struct PkgStoreMcpServer {
    app: Arc<App>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PkgStoreMcpServer {
    pub fn new(app: Arc<App>) -> Self {
        Self {
            app,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "list_updates",
        description = "List installed Go repositories that have newer commits upstream.\n\nOnly repositories with a clean working tree, checked out on their default branch, and behind their remote are listed. Each entry shows the repository root, its packages, the pending commits (newest first) when the hosting service can provide them, and the import path pattern to pass to update_packages."
    )]
    async fn list_updates(
        &self,
        Parameters(args): Parameters<ListUpdatesArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::list_updates(&self.app, args).await
    }

    #[tool(
        name = "update_packages",
        description = "Update the packages matching an import path pattern (e.g. \"github.com/owner/repo/...\") through the Go package manager. Updates run one at a time; the call returns when this update has finished."
    )]
    async fn update_packages(
        &self,
        Parameters(args): Parameters<UpdatePackagesArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::update_packages(&self.app, args).await
    }

    #[tool(
        name = "update_supported",
        description = "Report whether packages from the current package source can be updated."
    )]
    fn update_supported(
        &self,
        Parameters(_): Parameters<UpdateSupportedArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::update_supported(&self.app)
    }
}

#[tool_handler]
impl ServerHandler for PkgStoreMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pkgstore".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "pkgstore lists Go packages with upstream updates and applies updates.".to_string(),
            ),
        }
    }
}
