//! MCP server startup.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use super::server::PkgStoreMcpServer;
use crate::app::App;

/// Run the MCP server over stdio until the client disconnects.
pub async fn run_mcp_server(app: Arc<App>) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("🔧 Starting pkgstore MCP server (stdio)");

    let service = PkgStoreMcpServer::new(app)
        .serve(stdio())
        .await
        .map_err(|e| {
            error!("Failed to start MCP service: {:?}", e);
            anyhow::anyhow!("Failed to start MCP service: {:?}", e)
        })?;

    info!("🔗 Ready for MCP client connections");

    service.waiting().await.map_err(|e| {
        error!("MCP service error: {:?}", e);
        anyhow::anyhow!("MCP service error: {:?}", e)
    })?;

    info!("MCP server shutting down");
    Ok(())
}
