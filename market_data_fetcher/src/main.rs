use clap::Parser;
use tracing_subscriber::EnvFilter;

use market_data_fetcher::cli::commands::{Cli, Commands};
use market_data_fetcher::cli::params::parse_requests;
use market_data_fetcher::config::FetcherConfig;
use market_data_fetcher::errors::Error;
use market_data_fetcher::providers::binance_rest::BinanceProvider;
use market_data_fetcher::providers::{InitSnafu, fetch_all};
use snafu::ResultExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(error) = run(Cli::parse()).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = match &cli.config {
        Some(path) => FetcherConfig::load(path)?,
        None => FetcherConfig::default(),
    };
    let provider = BinanceProvider::new(config.into_binance())
        .context(InitSnafu)
        .map_err(Error::Provider)?;

    match cli.command {
        Commands::Fetch {
            symbols,
            interval,
            start,
            end,
            timeout_secs,
        } => {
            let requests =
                parse_requests(&symbols, &interval, &start, end.as_deref(), timeout_secs)?;
            let results = fetch_all(&provider, &requests).await;
            let total = results.len();

            let mut failed = 0;
            for (request, result) in requests.iter().zip(results) {
                match result {
                    Ok(series) => println!("{}", serde_json::to_string(&series)?),
                    Err(error) => {
                        failed += 1;
                        eprintln!("{}: {error}", request.symbol);
                    }
                }
            }
            if failed > 0 {
                return Err(Error::PartialFailure { failed, total });
            }
        }
    }

    Ok(())
}
