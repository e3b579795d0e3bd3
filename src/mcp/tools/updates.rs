//! Update listing and update tools.

use rmcp::{model::CallToolResult, ErrorData as McpError};
use tracing::info;

use super::common::{tool_error, tool_text};
use crate::app::App;
use crate::mcp::types::{ListUpdatesArgs, UpdatePackagesArgs};
use crate::render::TextReport;
use crate::updater::UpdateOutcome;

/// Run a pass and return the plain-text report.
pub async fn list_updates(app: &App, args: ListUpdatesArgs) -> Result<CallToolResult, McpError> {
    let mut report = TextReport::default();
    match app.check(&mut report, args.limit).await {
        Ok(summary) => {
            info!("list_updates: {} of {} repositories", summary.presented, summary.repositories);
            Ok(tool_text(report.into_text()))
        }
        Err(e) => Ok(tool_error(format!("Error listing packages: {}", e))),
    }
}

pub async fn update_packages(app: &App, args: UpdatePackagesArgs) -> Result<CallToolResult, McpError> {
    let pattern = args.import_path_pattern;
    match app.updates().submit(&pattern).await {
        Ok(UpdateOutcome::Updated) => Ok(tool_text(format!("Updated {}", pattern.trim()))),
        Ok(UpdateOutcome::Unsupported) => Ok(tool_text(format!(
            "Skipped {}: updates are disabled for this package source",
            pattern.trim()
        ))),
        Err(e) => Ok(tool_error(format!("Error: {}", e))),
    }
}

pub fn update_supported(app: &App) -> Result<CallToolResult, McpError> {
    Ok(tool_text(app.updates().is_supported().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::empty_app;
    use crate::updater::{MockUpdater, Updater};
    use std::sync::Arc;
    use std::time::Duration;

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }

    #[tokio::test]
    async fn test_list_updates_on_empty_source() {
        let app = empty_app(None);
        let result = list_updates(&app, ListUpdatesArgs::default()).await.unwrap();
        assert!(!is_error(&result));
    }

    #[tokio::test]
    async fn test_update_without_updater_is_reported_not_failed() {
        let app = empty_app(None);
        let args = UpdatePackagesArgs {
            import_path_pattern: "example.com/o/r/...".to_string(),
        };
        let result = update_packages(&app, args).await.unwrap();
        assert!(!is_error(&result));
    }

    #[tokio::test]
    async fn test_update_with_mock_updater() {
        let updater: Arc<dyn Updater> = Arc::new(MockUpdater::new(Duration::ZERO));
        let app = empty_app(Some(updater));

        let args = UpdatePackagesArgs {
            import_path_pattern: "example.com/o/r/...".to_string(),
        };
        assert!(!is_error(&update_packages(&app, args).await.unwrap()));

        let empty = UpdatePackagesArgs {
            import_path_pattern: " ".to_string(),
        };
        assert!(is_error(&update_packages(&app, empty).await.unwrap()));
    }
}
