use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod app;
mod cli;
mod command;
mod config;
mod domain;
mod error;
mod mcp;
mod pipeline;
mod presenter;
mod render;
mod updater;
mod vcs;
mod workspace;

use app::App;
use cli::{Cli, Commands};
use config::Config;
use workspace::{GopathScan, ManifestKind, ManifestSource, PackageList, PackageSource};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let source = package_source(&cli, &config)?;
    let app = Arc::new(App::from_config(&config, source, cli.dry_run)?);

    if cli.mcp {
        return mcp::run_mcp_server(app).await;
    }

    match cli.command {
        None | Some(Commands::Check) => command::run_check(&app, cli.limit).await?,
        Some(Commands::Update { patterns }) => command::run_update(&app, &patterns).await?,
        Some(Commands::Status) => command::run_status(&app).await?,
    }

    Ok(())
}

fn package_source(cli: &Cli, config: &Config) -> Result<Arc<dyn PackageSource>> {
    let roots = config.source_roots();

    let source: Arc<dyn PackageSource> = if cli.stdin {
        Arc::new(PackageList::from_reader(std::io::stdin().lock(), &roots)?)
    } else if let Some(path) = &cli.godeps {
        Arc::new(ManifestSource::new(ManifestKind::Godeps, path, roots))
    } else if let Some(path) = &cli.govendor {
        Arc::new(ManifestSource::new(ManifestKind::Govendor, path, roots))
    } else {
        Arc::new(GopathScan::new(roots, config.goroot.clone()))
    };
    Ok(source)
}
