use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::github::{GithubClient, IssueSearcher, ReadmeFetcher, RepoId};

mod app;
mod cli;
mod command;
mod config;
mod github;
mod markdown;
mod message;
mod pages;
mod theme;
mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting ghdash");

    let args = cli::Args::parse();

    let config = config::load()?;
    let theme = theme::theme_from_name(&config.ui.theme);

    let repo: RepoId = args.repo.parse()?;
    let token = args.token.or_else(|| std::env::var("GITHUB_TOKEN").ok());
    let client = Arc::new(GithubClient::new(token)?);

    let mut app = App::new(
        repo,
        Arc::clone(&client) as Arc<dyn IssueSearcher>,
        client as Arc<dyn ReadmeFetcher>,
        &config,
        theme,
    );
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("ghdash").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "ghdash.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
