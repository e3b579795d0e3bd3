use anyhow::{bail, Result};
use futures_util::future::join_all;

use crate::app::App;
use crate::updater::UpdateOutcome;

/// Submit every pattern at once; the update service runs them one by one.
///
/// Sources without update support turn every pattern into a no-op that is
/// reported, not an error.
pub async fn run_update(app: &App, patterns: &[String]) -> Result<()> {
    let results = join_all(patterns.iter().map(|p| app.updates().submit(p))).await;

    let mut failed = 0;
    for (pattern, result) in patterns.iter().zip(results) {
        match result {
            Ok(UpdateOutcome::Updated) => println!("✅ Updated {}", pattern),
            Ok(UpdateOutcome::Unsupported) => {
                println!("⚠️  Skipped {}: updates are disabled for this package source", pattern)
            }
            Err(e) => {
                failed += 1;
                println!("❌ {}: {}", pattern, e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} updates failed", failed, patterns.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::empty_app;
    use crate::updater::{MockUpdater, Updater};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_update_on_source_without_updater_succeeds() {
        let app = empty_app(None);
        let patterns = vec!["example.com/o/r/...".to_string()];
        assert!(run_update(&app, &patterns).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_update_is_an_error() {
        let updater: Arc<dyn Updater> = Arc::new(MockUpdater::new(Duration::ZERO));
        let app = empty_app(Some(updater));
        let patterns = vec!["example.com/o/r/...".to_string(), " ".to_string()];
        assert!(run_update(&app, &patterns).await.is_err());
    }
}
