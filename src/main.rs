mod cache;
mod cli;
mod config;
mod feed;
mod fetch;
mod html;
mod query;
mod render;
mod server;
mod state;
mod template;
mod text;
mod theme;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use cli::{Args, Command};
use config::Config;
use fetch::{FeedClient, FeedSource};
use server::Server;
use state::State;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn set_up_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_regex(false)
                .with_default_directive(Level::INFO.into())
                .with_env_var("READMECARDS_LOG")
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    set_up_logging();

    let mut args = Args::parse();
    let config = match load_config(&mut args) {
        Ok(config) => config,

        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(Command::Fetch { username }) = args.command {
        return match print_feed(&config, &username).await {
            Ok(()) => ExitCode::SUCCESS,

            Err(e) => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        };
    }

    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();

        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("could not listen for Ctrl-C: {e:#}");
            }

            cancel.cancel();
        }
    });

    let mut tasks = match start(config, cancel.clone()).await {
        Ok(tasks) => tasks,

        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut exit_code = ExitCode::SUCCESS;

    while let Some(task_result) = tasks.join_next().await {
        cancel.cancel();

        match task_result {
            Ok(Ok(())) => {}

            Ok(Err(e)) => {
                error!("{e:#}");
                exit_code = ExitCode::FAILURE;
            }

            Err(e) => {
                error!("{e:#}");
                exit_code = ExitCode::FAILURE;
            }
        }
    }

    exit_code
}

fn load_config(args: &mut Args) -> Result<Config> {
    let config_paths = args
        .config_path
        .take()
        .into_iter()
        .chain([
            PathBuf::from("./readme-cards.toml"),
            PathBuf::from("/etc/readme-cards.toml"),
        ])
        .collect::<Vec<_>>();
    let mut config = config::load(&config_paths)?;
    config.update(args);

    Ok(config)
}

async fn start(config: Config, cancel: CancellationToken) -> Result<JoinSet<Result<()>>> {
    let state = State::new(config)?;
    let server = Server::new(state).await?;

    let mut tasks = JoinSet::new();
    tasks.spawn(server.serve(cancel));

    Ok(tasks)
}

async fn print_feed(config: &Config, username: &str) -> Result<()> {
    let client = FeedClient::new(config)?;
    let feed = client
        .fetch(username)
        .await
        .with_context(|| anyhow!("could not fetch the feed of `{username}`"))?;

    println!("Status: {}", feed.status);
    println!("Title: {}", feed.feed.title);
    println!("Author: {}", feed.feed.author);
    println!("Link: {}", feed.feed.link);
    println!("Image: {}", feed.feed.image);

    for (idx, article) in feed.items.iter().enumerate() {
        println!();
        println!("#{} {}", idx + 1, article.title);
        println!("  Published: {}", article.pub_date);
        println!("  Link: {}", article.link);

        if !article.categories.is_empty() {
            println!("  Categories: {}", article.categories.join(", "));
        }

        let description = html::plain_text(&article.description);

        if !description.is_empty() {
            println!("  {}", text::truncate(&description, 200).replace('\n', "\n  "));
        }
    }

    Ok(())
}
