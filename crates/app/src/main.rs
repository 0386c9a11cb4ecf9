use std::process::ExitCode;

use engine::{FileStore, Tracker};
use settings::Command;
use tokio::io::BufReader;

mod commands;
mod error;
mod render;
mod session;
mod settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::load()?;
    let config = settings.config;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "shop_for_progress={level},engine={level}",
            level = config.level
        ))
        .init();

    let directory = config.directory()?;
    let timezone = config.timezone()?;
    tracing::info!(
        "using ledger at {} ({} campaigns, {timezone})",
        config.data_path,
        directory.listed().len()
    );
    let mut tracker = Tracker::open(FileStore::new(&config.data_path), directory);

    match settings.command {
        Command::Flow => {
            let session = session::Session::new(tracker, timezone);
            let input = BufReader::new(tokio::io::stdin());
            session::run(session, input, tokio::io::stdout()).await?;
            Ok(ExitCode::SUCCESS)
        }
        command => Ok(commands::run(&mut tracker, command, timezone)),
    }
}
