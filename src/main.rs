use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tweetline::commands::Session;
use tweetline::config::{Config, ACCESS_TOKEN_ENV};
use tweetline::feeds::snapshot::{FileSnapshot, SnapshotStore};
use tweetline::feeds::twitter::TwitterClient;
use tweetline::format::Formatter;
use tweetline::repl::{self, StdConsole};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(token) = config.access_token() else {
        eprintln!(
            "No access token found. Set {} or add api.access_token to {}",
            ACCESS_TOKEN_ENV,
            Config::default_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "the config file".to_string()),
        );
        std::process::exit(1);
    };

    let client = Arc::new(TwitterClient::new(&config.api, token));
    let snapshots = config.cache.snapshot_path().map(|path| {
        tracing::debug!(path = %path.display(), "timeline snapshot location");
        Box::new(FileSnapshot::new(path)) as Box<dyn SnapshotStore>
    });

    let mut session = Session::new(client, snapshots, Formatter::new(&config.display));
    let mut console = StdConsole::new();
    repl::run(&mut session, &mut console).await?;
    Ok(())
}
