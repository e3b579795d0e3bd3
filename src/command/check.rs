use anyhow::Result;

use crate::app::App;
use crate::render::ConsoleRenderer;

pub async fn run_check(app: &App, limit: Option<usize>) -> Result<()> {
    let mut renderer = ConsoleRenderer::default();
    app.check(&mut renderer, limit).await?;
    Ok(())
}
