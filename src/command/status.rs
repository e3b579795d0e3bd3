use anyhow::Result;

use crate::app::App;

pub async fn run_status(app: &App) -> Result<()> {
    let survey = app.survey().await?;

    println!("📦 {} packages in {} repositories", survey.packages, survey.repositories);
    println!("   With updates: {}", survey.with_updates);
    if survey.dirty > 0 {
        println!("   Dirty working trees: {}", survey.dirty);
    }
    if survey.off_default_branch > 0 {
        println!("   Off default branch: {}", survey.off_default_branch);
    }
    if survey.status_failures > 0 {
        println!("⚠️  Status unavailable: {}", survey.status_failures);
    }
    println!("   Cached comparisons: {}", survey.comparisons);
    if !app.updates().is_supported() {
        println!("   Updates are not available for this package source.");
    }

    Ok(())
}
