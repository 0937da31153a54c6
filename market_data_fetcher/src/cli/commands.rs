use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to an optional TOML config file (fetcher.toml)
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch OHLCV bars and print one JSON series per symbol
    Fetch {
        /// Comma-separated list of symbols (e.g. "BTCUSDT,ETHUSDT")
        #[arg(long)]
        symbols: String,

        /// Bar interval: 1m 3m 5m 15m 30m 1h 2h 4h 6h 8h 12h 1d 3d 1w 1M
        #[arg(long, default_value = "1h")]
        interval: String,

        /// Start datetime in ISO8601 format (e.g. "2025-01-01T00:00:00Z")
        #[arg(long)]
        start: String,

        /// End datetime in ISO8601 format; defaults to now
        #[arg(short, long)]
        end: Option<String>,

        /// Overall deadline per symbol, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}
