//! `rbxlink` command line entry point.

mod app;
mod cli;
mod render;

use anyhow::Result;
use clap::Parser;
use rbxlink_config::{ConfigLoader, ConfigLoaderOptions};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::{Cli, Command, SessionAction, UserAction};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,rbxlink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let load = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: cli.config.clone(),
        env_file: cli.env_file.clone(),
        env: None,
    })
    .load()?;
    for warning in load.warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let app = App::from_config(&load.config)?;

    match cli.command {
        Command::Session { action } => match action {
            SessionAction::Use { username } => app.use_account(&username).await?,
            SessionAction::Show => app.show_session(),
            SessionAction::Clear => app.clear_session()?,
        },
        Command::User { action } => match action {
            UserAction::Add {
                username,
                email,
                role,
            } => app.add_user(&username, &email, role).await?,
        },
        Command::List => app.list().await?,
        Command::Register { name, yes } => app.register(&name, yes).await?,
        Command::Unregister { user, yes } => app.unregister(user, yes).await?,
        Command::Describe { id } => app.describe(id).await?,
    }

    Ok(())
}
