mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cli::{dispatch, Cli};
use stagectl::commands::common::GlobalArgs;

const LOG_ENV: &str = "STAGECTL_LOG";
const LOG_FORMAT_ENV: &str = "STAGECTL_LOG_FORMAT";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("stagectl=info"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let global: GlobalArgs = cli.global.into();
    dispatch(&global, cli.command)
}
