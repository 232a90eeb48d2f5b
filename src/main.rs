mod api;
mod cli;
mod context;
mod core;
mod error;
mod prelude;
mod quantity;
mod storage;
mod tables;

use clap::{Parser, crate_version};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Args, Command},
    error::Failure,
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .compact()
        .init();
    info!(version = crate_version!(), "starting…");

    let result = match Args::parse().command {
        Command::Entities(args) => cli::entities(&args).await,
        Command::Readings(args) => cli::readings(&args).await,
        Command::Record(args) => cli::record(*args).await,
        Command::Recordings(args) => cli::recordings(&args),
        Command::Forecast(args) => cli::forecast(*args).await,
        Command::Check(args) => cli::check(*args).await,
        Command::Predict(args) => cli::predict(*args).await,
    };
    if let Err(error) = &result
        && let Some(kind) = Failure::kind_of(error)
    {
        error!(%kind, "failed");
    }
    result
}
