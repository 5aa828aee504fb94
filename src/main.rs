use clap::Parser;
use cli::Args;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub mod ethers_utils;
pub mod forge_utils;
pub mod serde_utils;

mod cli;
mod config;
mod framework;
mod report;
mod runner;
mod types;

mod deployment;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new();

    let filter = EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    // Usage errors exit with 1 like any other failure
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            err.print()?;
            std::process::exit(1)
        }
    };

    let outcome = deployment::run_deployment(args).await;

    outcome.emit(&mut std::io::stdout().lock(), &mut std::io::stderr().lock())?;

    std::process::exit(outcome.exit_code())
}
